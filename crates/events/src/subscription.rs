//! Channel subscriptions to a manager's events.
//!
//! Listeners run inline and can abort the operation that fired the event.
//! Subscribers only observe: each one gets a copy of every event that
//! triggered successfully, queued on its own channel.

use std::sync::{Mutex, mpsc};

use crate::ListenerError;

/// Receiving end handed out by [`EventManager::subscribe`](crate::EventManager::subscribe).
///
/// Sees every event triggered after it was created, in trigger order.
///
/// ```ignore
/// let audit = service.event_manager().subscribe();
/// service.logout()?;
/// for event in audit.drain() {
///     record(event);
/// }
/// ```
#[derive(Debug)]
pub struct Subscription<E> {
    receiver: mpsc::Receiver<E>,
}

impl<E> Subscription<E> {
    /// The oldest queued event, if any. Never blocks.
    pub fn try_next(&self) -> Option<E> {
        self.receiver.try_recv().ok()
    }

    /// Everything queued so far.
    pub fn drain(&self) -> Vec<E> {
        self.receiver.try_iter().collect()
    }
}

/// Fan-out to live subscriptions; dropped ones are pruned on publish.
#[derive(Debug)]
pub(crate) struct Subscribers<E> {
    senders: Mutex<Vec<mpsc::Sender<E>>>,
}

impl<E: Clone> Subscribers<E> {
    pub(crate) fn subscribe(&self) -> Subscription<E> {
        let (tx, rx) = mpsc::channel();
        // A poisoned list still hands out a subscription that stays empty.
        if let Ok(mut senders) = self.senders.lock() {
            senders.push(tx);
        }
        Subscription { receiver: rx }
    }

    pub(crate) fn publish(&self, event: &E) -> Result<(), ListenerError> {
        let mut senders = self.senders.lock().map_err(|_| ListenerError::Poisoned)?;
        senders.retain(|tx| tx.send(event.clone()).is_ok());
        Ok(())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.senders.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self {
            senders: Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_subscription_gets_its_own_copy() {
        let subscribers = Subscribers::default();
        let first = subscribers.subscribe();
        let second = subscribers.subscribe();

        subscribers.publish(&"pre.login").unwrap();
        subscribers.publish(&"post.login").unwrap();

        assert_eq!(first.try_next(), Some("pre.login"));
        assert_eq!(first.drain(), vec!["post.login"]);
        assert_eq!(second.drain(), vec!["pre.login", "post.login"]);
        assert_eq!(first.try_next(), None);
    }

    #[test]
    fn late_subscription_misses_earlier_events() {
        let subscribers = Subscribers::default();
        subscribers.publish(&1).unwrap();
        let late = subscribers.subscribe();
        subscribers.publish(&2).unwrap();

        assert_eq!(late.drain(), vec![2]);
    }

    #[test]
    fn dropped_subscriptions_are_pruned() {
        let subscribers = Subscribers::default();
        let kept = subscribers.subscribe();
        drop(subscribers.subscribe());

        subscribers.publish(&()).unwrap();

        assert_eq!(subscribers.len(), 1);
        assert_eq!(kept.drain().len(), 1);
    }
}
