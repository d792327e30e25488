//! Menu pages and key bindings.
//!
//! Pure lookup: which action a key triggers on which page, and what each
//! page shows.  The [`MenuController`](super::service::MenuController)
//! performs the actions.

use crate::events::Key;

/// Idle menu page texts (line 1, line 2).  The display truncates to 16 columns.
pub const IDLE_PAGES: [(&str, &str); 3] = [
    ("1. Start/Stop Engine", "2. Lock/Unlock Door"),
    ("3. Check Sensors", "4. Initialise Mobile Conn"),
    ("5. Low power mode", "6. Power off"),
];

pub const MAIN_MENU: (&str, &str) = ("1. Initialize", "2. Lock/Unlock");

/// Which screen the controller is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuPage {
    Main,
    /// Idle menu page index (`0..IDLE_PAGES.len()`).
    Idle(usize),
}

impl MenuPage {
    pub fn lines(self) -> (&'static str, &'static str) {
        match self {
            Self::Main => MAIN_MENU,
            Self::Idle(page) => IDLE_PAGES[page % IDLE_PAGES.len()],
        }
    }
}

/// Something a key press asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Main `1`: enter the idle menu at page 0.
    EnterIdleMenu,
    /// Main `2` and idle `2`.
    ToggleDoor,
    /// Idle `1`.
    ToggleEngine,
    /// Idle `3`.
    CheckSensors,
    /// Idle `4` (placeholder screen only).
    MobileConnection,
    /// Idle `5` (placeholder screen only).
    LowPowerMode,
    /// Idle `6`: stop the engine and return to the main menu.
    PowerOff,
    /// `*`
    PreviousPage,
    /// `#`
    NextPage,
}

/// Resolve a key on `page`.  Keys bound to another page are ignored.
pub fn action_for(page: MenuPage, key: Key) -> Option<MenuAction> {
    match (page, key) {
        (MenuPage::Main, Key::Digit(1)) => Some(MenuAction::EnterIdleMenu),
        (MenuPage::Main, Key::Digit(2)) => Some(MenuAction::ToggleDoor),
        (MenuPage::Main, _) => None,

        (MenuPage::Idle(_), Key::Star) => Some(MenuAction::PreviousPage),
        (MenuPage::Idle(_), Key::Hash) => Some(MenuAction::NextPage),
        (MenuPage::Idle(0), Key::Digit(1)) => Some(MenuAction::ToggleEngine),
        (MenuPage::Idle(0), Key::Digit(2)) => Some(MenuAction::ToggleDoor),
        (MenuPage::Idle(1), Key::Digit(3)) => Some(MenuAction::CheckSensors),
        (MenuPage::Idle(1), Key::Digit(4)) => Some(MenuAction::MobileConnection),
        (MenuPage::Idle(2), Key::Digit(5)) => Some(MenuAction::LowPowerMode),
        (MenuPage::Idle(2), Key::Digit(6)) => Some(MenuAction::PowerOff),
        (MenuPage::Idle(_), _) => None,
    }
}

/// Wrapping page step.
pub fn step_page(page: usize, forward: bool) -> usize {
    let n = IDLE_PAGES.len();
    if forward { (page + 1) % n } else { (page + n - 1) % n }
}
