pub mod board;
pub mod document;
pub mod editor;
pub mod import;
pub mod input;
pub mod layout;
pub mod media;
pub mod nav;
pub mod play;
pub mod question;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod team;
pub mod view;
