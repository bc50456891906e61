use crate::error::FlashError;
use crate::settings::Rgb;

/// Host window features an overlay wants. Every call is best-effort.
pub trait WindowStyling {
    /// Makes pixels of `key` invisible.
    fn set_transparent(&mut self, key: Rgb) -> Result<(), FlashError>;
    fn set_topmost(&mut self) -> Result<(), FlashError>;
    /// Lets mouse input pass through to the windows below.
    fn set_click_through(&mut self) -> Result<(), FlashError>;
}

/// For platforms (and tests) without styling support.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStyling;

impl WindowStyling for NoopStyling {
    fn set_transparent(&mut self, _key: Rgb) -> Result<(), FlashError> {
        Ok(())
    }

    fn set_topmost(&mut self) -> Result<(), FlashError> {
        Ok(())
    }

    fn set_click_through(&mut self) -> Result<(), FlashError> {
        Ok(())
    }
}

/// Which styling requests took effect.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StylingReport {
    pub transparent: bool,
    pub topmost: bool,
    pub click_through: bool,
}

/// Applies every overlay style, logging and swallowing failures.
pub fn apply_overlay_styling(styling: &mut dyn WindowStyling, key: Rgb) -> StylingReport {
    fn applied(what: &str, result: Result<(), FlashError>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("{what}: {e}, continuing without it");
                false
            }
        }
    }

    StylingReport {
        transparent: applied("transparency", styling.set_transparent(key)),
        topmost: applied("always-on-top", styling.set_topmost()),
        click_through: applied("click-through", styling.set_click_through()),
    }
}
