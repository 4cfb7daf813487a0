//! Target resolution
//!
//! Turns a bundle of loose locator hints into one element. Strategies are
//! tried lazily in a fixed order and the first one with a match wins:
//! text, placeholder, role + name (needs both `role` and `text`), raw selector.

use tracing::{debug, warn};

use crate::browser::{Browser, ElementHandle, Locator};
use crate::core::{LocatorHints, Result, TraceError};

/// Candidate locators for a hint bundle, in precedence order
pub fn strategies(hints: &LocatorHints) -> Vec<Locator> {
    let mut locators = Vec::new();

    if let Some(text) = &hints.text {
        locators.push(Locator::Text(text.clone()));
    }
    if let Some(placeholder) = &hints.placeholder {
        locators.push(Locator::Placeholder(placeholder.clone()));
    }
    if let (Some(role), Some(text)) = (&hints.role, &hints.text) {
        locators.push(Locator::Role {
            role: role.clone(),
            name: text.clone(),
        });
    }
    if let Some(selector) = &hints.selector {
        locators.push(Locator::Selector(selector.clone()));
    }

    locators
}

/// Resolve `hints` to the first matching element
pub async fn resolve<B>(browser: &mut B, hints: &LocatorHints) -> Result<ElementHandle>
where
    B: Browser + ?Sized,
{
    if hints.is_empty() {
        warn!("Step has no locator hints");
        return Err(TraceError::TargetNotFound {
            hints: hints.clone(),
        });
    }

    for locator in strategies(hints) {
        let matches = browser.query(&locator).await?;
        debug!(%locator, count = matches.len(), "locator strategy tried");

        if let Some(first) = matches.into_iter().next() {
            return Ok(ElementHandle {
                locator,
                target: first,
                hints: hints.clone(),
            });
        }
    }

    Err(TraceError::TargetNotFound {
        hints: hints.clone(),
    })
}
