use std::fmt;

/// Key shared between views for linked highlighting.
///
/// Every character outside ASCII alphanumerics is replaced by `-`, so the
/// key is safe to use as a structural identifier and producers and
/// consumers normalize identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HighlightKey(String);

impl HighlightKey {
    pub fn new(raw: &str) -> Self {
        Self(
            raw.chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
                .collect(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HighlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Emphasis {
    Full,
    Dimmed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightEvent {
    Broadcast(HighlightKey),
    Clear,
}

impl HighlightEvent {
    /// Emphasis a subscriber should give an element carrying `element_key`.
    pub fn emphasis_for(&self, element_key: &str) -> Emphasis {
        match self {
            HighlightEvent::Clear => Emphasis::Full,
            HighlightEvent::Broadcast(active) => emphasis(Some(active), element_key),
        }
    }
}

fn emphasis(active: Option<&HighlightKey>, element_key: &str) -> Emphasis {
    match active {
        Some(key) if *key != HighlightKey::new(element_key) => Emphasis::Dimmed,
        _ => Emphasis::Full,
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&HighlightEvent)>;

/// Publish/subscribe channel for hover and selection keys.
///
/// Views never reference each other; they subscribe here and compare
/// their own element keys against the broadcast one. Subscribers are
/// notified in subscription order.
#[derive(Default)]
pub struct HighlightBus {
    active: Option<HighlightKey>,
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
}

impl fmt::Debug for HighlightBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HighlightBus")
            .field("active", &self.active)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl HighlightBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&HighlightEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn active(&self) -> Option<&HighlightKey> {
        self.active.as_ref()
    }

    pub fn broadcast(&mut self, raw_key: &str) {
        let key = HighlightKey::new(raw_key);
        self.active = Some(key.clone());
        self.publish(&HighlightEvent::Broadcast(key));
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.publish(&HighlightEvent::Clear);
    }

    pub fn emphasis_for(&self, element_key: &str) -> Emphasis {
        emphasis(self.active.as_ref(), element_key)
    }

    fn publish(&mut self, event: &HighlightEvent) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Emphasis, HighlightBus, HighlightEvent, HighlightKey};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn key_replaces_unsafe_characters() {
        assert_eq!(HighlightKey::new("United States").as_str(), "United-States");
        assert_eq!(HighlightKey::new("a'b]c").as_str(), "a-b-c");
        assert_eq!(HighlightKey::new("Côte").as_str(), "C-te");
    }

    #[test]
    fn broadcast_dims_everything_but_the_key() {
        let mut bus = HighlightBus::new();
        bus.broadcast("South Africa");
        assert_eq!(bus.emphasis_for("South Africa"), Emphasis::Full);
        assert_eq!(bus.emphasis_for("South-Africa"), Emphasis::Full);
        assert_eq!(bus.emphasis_for("Chile"), Emphasis::Dimmed);
        bus.clear();
        assert_eq!(bus.emphasis_for("Chile"), Emphasis::Full);
    }

    #[test]
    fn subscribers_see_events_in_order() {
        let seen: Rc<RefCell<Vec<HighlightEvent>>> = Rc::default();
        let mut bus = HighlightBus::new();
        let sink = Rc::clone(&seen);
        let id = bus.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        bus.broadcast("Flood");
        bus.clear();
        assert!(bus.unsubscribe(id));
        bus.broadcast("Storm");

        let seen = seen.borrow();
        assert_eq!(
            *seen,
            vec![
                HighlightEvent::Broadcast(HighlightKey::new("Flood")),
                HighlightEvent::Clear
            ]
        );
        assert_eq!(seen[0].emphasis_for("Storm"), Emphasis::Dimmed);
        assert_eq!(seen[1].emphasis_for("Storm"), Emphasis::Full);
    }

    #[test]
    fn unsubscribe_unknown_is_noop() {
        let mut bus = HighlightBus::new();
        let id = bus.subscribe(|_| {});
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
