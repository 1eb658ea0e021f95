use std::fs;
use std::io;

use game::board::CellId;
use game::document;
use game::editor::QuizDraft;

fn main() -> io::Result<()> {
    let mut draft = QuizDraft::new("Guess the video game music");
    draft.categories = [
        "CHIPTUNES".to_string(),
        "ORCHESTRAL".to_string(),
        "BATTLE THEMES".to_string(),
        "TOWN THEMES".to_string(),
        "FINAL BOSSES".to_string(),
    ];

    if let Some(cell) = draft.cell_mut(CellId::new(0, 0)) {
        cell.prompt = "This 8-bit overworld theme\nneeds no introduction".to_string();
        cell.response = "What is Super Mario Bros.?".to_string();
        cell.hint = "It's-a him".to_string();
        cell.audio = true;
    }

    let doc = document::export(&draft);
    fs::write(&doc.filename, &doc.html)?;

    println!(
        "wrote {} ({} bytes, storage key {})",
        doc.filename,
        doc.html.len(),
        doc.identity.storage_key
    );
    Ok(())
}
