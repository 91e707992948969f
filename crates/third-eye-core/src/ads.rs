//! Sponsor messages attached to capture metadata
//!
//! Captures are free; each successful one carries a short sponsor line in
//! `metadata.sponsored`. The dispatcher holds an
//! `Option<Arc<dyn AdProvider>>`, and `None` disables sponsoring entirely.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Built-in sponsor rotation
pub const DEFAULT_MESSAGES: &[&str] = &[
    "Third Eye is free and unlimited. Star the project if it saves you time.",
    "Sponsored: your message here. Reach every agent that looks at a screen.",
    "Third Eye: screenshots for agents, no accounts and no quotas.",
];

/// Source of the sponsor string for one capture
pub trait AdProvider: Send + Sync {
    /// Returns the sponsor message for the next capture
    fn get_ad(&self) -> String;
}

/// Round-robin over a fixed list of messages
#[derive(Debug)]
pub struct RotatingAds {
    messages: Vec<String>,
    next:     AtomicUsize,
}

impl RotatingAds {
    /// Rotates through [`DEFAULT_MESSAGES`]
    pub fn new() -> Self {
        Self::with_messages(Vec::new())
    }

    /// Rotates through `messages`, or the defaults when the list is empty
    ///
    /// # Examples
    ///
    /// ```
    /// use third_eye_core::ads::{AdProvider, RotatingAds};
    ///
    /// let ads = RotatingAds::with_messages(vec!["a".into(), "b".into()]);
    /// assert_eq!(ads.get_ad(), "a");
    /// assert_eq!(ads.get_ad(), "b");
    /// assert_eq!(ads.get_ad(), "a");
    /// ```
    pub fn with_messages(messages: Vec<String>) -> Self {
        let messages = if messages.is_empty() {
            DEFAULT_MESSAGES.iter().map(|m| m.to_string()).collect()
        } else {
            messages
        };

        Self {
            messages,
            next: AtomicUsize::new(0),
        }
    }
}

impl Default for RotatingAds {
    fn default() -> Self {
        Self::new()
    }
}

impl AdProvider for RotatingAds {
    fn get_ad(&self) -> String {
        let slot = self.next.fetch_add(1, Ordering::Relaxed) % self.messages.len();
        self.messages[slot].clone()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_default_messages_non_empty() {
        let ads = RotatingAds::new();
        for _ in 0..10 {
            assert!(!ads.get_ad().is_empty());
        }
    }

    #[test]
    fn test_rotation_covers_all_defaults() {
        let ads = RotatingAds::new();
        let seen: HashSet<String> = (0..DEFAULT_MESSAGES.len()).map(|_| ads.get_ad()).collect();
        assert_eq!(seen.len(), DEFAULT_MESSAGES.len());
    }

    #[test]
    fn test_empty_list_falls_back_to_defaults() {
        let ads = RotatingAds::with_messages(Vec::new());
        assert_eq!(ads.get_ad(), DEFAULT_MESSAGES[0]);
    }

    #[test]
    fn test_single_message_repeats() {
        let ads = RotatingAds::with_messages(vec!["only".to_string()]);
        assert_eq!(ads.get_ad(), "only");
        assert_eq!(ads.get_ad(), "only");
    }

    #[test]
    fn test_usable_as_trait_object() {
        let provider: std::sync::Arc<dyn AdProvider> = std::sync::Arc::new(RotatingAds::new());
        assert!(!provider.get_ad().is_empty());
    }
}
