use runtime::store::StateStore;

pub const AUTOPLAY_KEY: &str = "autoplay";

/// Play-time preferences. `hints_enabled` is baked into the document at
/// generation time; `autoplay` is a per-player preference toggled with
/// Alt+A and persisted across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaySettings {
    pub hints_enabled: bool,
    pub autoplay: bool,
}

impl Default for PlaySettings {
    fn default() -> Self {
        Self {
            hints_enabled: true,
            autoplay: true,
        }
    }
}

impl PlaySettings {
    /// `hints_enabled` comes from the document flag; `autoplay` is
    /// restored from storage, defaulting to on when absent or mangled.
    pub fn boot(hints_enabled: bool, store: &dyn StateStore) -> Self {
        let autoplay = match store.get(AUTOPLAY_KEY).as_deref() {
            Some(raw) => raw.trim().parse::<i32>().map(|v| v != 0).unwrap_or(true),
            None => true,
        };
        Self {
            hints_enabled,
            autoplay,
        }
    }

    pub fn toggle_autoplay(&mut self, store: &mut dyn StateStore) -> bool {
        self.autoplay = !self.autoplay;
        store.put(AUTOPLAY_KEY, if self.autoplay { "1" } else { "0" });
        self.autoplay
    }
}
