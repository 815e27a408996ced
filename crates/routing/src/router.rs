use std::sync::Arc;

use {
    anyhow::{Context, Result},
    async_trait::async_trait,
    futures::future::join_all,
    tracing::{debug, info, warn},
};

use copycat_common::{MessageEvent, MessageHandler, Outbound, UserId};

use crate::{
    outputs::{OutputSet, Toggle},
    subscription::SubscriptionSet,
};

/// What routing one message produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteOutcome {
    /// Set when the message toggled its chat in the output set.
    pub toggled: Option<Toggle>,
    /// Destinations the forward reached.
    pub forwarded: usize,
    /// Destinations whose forward failed.
    pub failed: usize,
}

/// Per-message dispatch. One instance serves the whole run: it owns the
/// frozen subscription set, the mutable output set, and the outbound handle.
pub struct Router {
    subscriptions: SubscriptionSet,
    outputs: OutputSet,
    outbound: Arc<dyn Outbound>,
    owner: UserId,
    command: String,
}

impl Router {
    #[must_use]
    pub fn new(
        subscriptions: SubscriptionSet,
        outbound: Arc<dyn Outbound>,
        owner: UserId,
        command: impl Into<String>,
    ) -> Self {
        Self {
            subscriptions,
            outputs: OutputSet::new(),
            outbound,
            owner,
            command: command.into(),
        }
    }

    #[must_use]
    pub fn outputs(&self) -> &OutputSet {
        &self.outputs
    }

    /// Route one message.
    ///
    /// The toggle command is honored first and unconditionally: it works on
    /// outgoing messages, and a toggling message in a tracked chat is still
    /// forwarded. Per-destination forward failures are counted, not
    /// propagated; a failed confirmation send is an error.
    pub async fn route(&self, event: &MessageEvent) -> Result<RouteOutcome> {
        let mut outcome = RouteOutcome::default();

        if self.is_toggle_command(event) {
            let toggle = self.outputs.toggle(event.chat);
            outcome.toggled = Some(toggle);
            info!(chat = %event.chat, ?toggle, "output toggled");
            let confirmation = match toggle {
                Toggle::Added => "output set",
                Toggle::Removed => "output removed",
            };
            self.outbound
                .send_message(event.chat, confirmation)
                .await
                .context("send toggle confirmation")?;
        }

        // Messages sent by the account itself never route back out.
        if event.outgoing {
            return Ok(outcome);
        }

        let key = event.route_key();
        if !self.subscriptions.contains(&key) {
            return Ok(outcome);
        }

        let destinations = self.outputs.snapshot();
        if destinations.is_empty() {
            debug!(%key, "tracked message but no outputs set");
            return Ok(outcome);
        }

        let results = join_all(destinations.iter().map(|&to| async move {
            let result = self
                .outbound
                .forward_message(event.chat, to, event.message_id)
                .await;
            (to, result)
        }))
        .await;

        for (to, result) in results {
            match result {
                Ok(()) => outcome.forwarded += 1,
                Err(error) => {
                    outcome.failed += 1;
                    warn!(from = %event.chat, %to, %error, "forward failed");
                },
            }
        }
        info!(
            %key,
            forwarded = outcome.forwarded,
            failed = outcome.failed,
            "routed message"
        );

        Ok(outcome)
    }

    /// Full-text match of the configured command, ASCII case-insensitive,
    /// restricted to the owner account.
    fn is_toggle_command(&self, event: &MessageEvent) -> bool {
        event.sender == Some(self.owner)
            && event
                .text
                .as_deref()
                .is_some_and(|text| text.eq_ignore_ascii_case(&self.command))
    }
}

#[async_trait]
impl MessageHandler for Router {
    /// The outermost per-message boundary: everything `route` can fail with
    /// is logged here and goes no further.
    async fn on_message(&self, event: MessageEvent) {
        if let Err(error) = self.route(&event).await {
            warn!(chat = %event.chat, message = %event.message_id, %error, "routing failed");
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::{
        collections::HashSet,
        sync::{
            Mutex,
            atomic::{AtomicBool, Ordering},
        },
    };

    use anyhow::bail;

    use copycat_common::{ChatId, MessageId, RouteKey};

    use super::*;

    #[derive(Default)]
    struct RecordingOutbound {
        sent: Mutex<Vec<(ChatId, String)>>,
        forwards: Mutex<Vec<(ChatId, ChatId, MessageId)>>,
        /// Destinations whose forwards are refused.
        fail_forwards_to: Mutex<HashSet<ChatId>>,
        fail_sends: AtomicBool,
    }

    #[async_trait]
    impl Outbound for RecordingOutbound {
        async fn send_message(&self, chat: ChatId, text: &str) -> Result<()> {
            if self.fail_sends.load(Ordering::SeqCst) {
                bail!("send refused");
            }
            self.sent.lock().unwrap().push((chat, text.to_string()));
            Ok(())
        }

        async fn forward_message(
            &self,
            from: ChatId,
            to: ChatId,
            message: MessageId,
        ) -> Result<()> {
            if self.fail_forwards_to.lock().unwrap().contains(&to) {
                bail!("forward to {to} refused");
            }
            self.forwards.lock().unwrap().push((from, to, message));
            Ok(())
        }
    }

    const OWNER: UserId = UserId(1000);

    fn router(subs: impl IntoIterator<Item = RouteKey>) -> (Router, Arc<RecordingOutbound>) {
        let outbound = Arc::new(RecordingOutbound::default());
        let router = Router::new(
            SubscriptionSet::from_selection(subs),
            Arc::clone(&outbound) as Arc<dyn Outbound>,
            OWNER,
            "/copycat",
        );
        (router, outbound)
    }

    fn message(chat: i64, text: &str) -> MessageEvent {
        MessageEvent {
            chat: ChatId(chat),
            message_id: MessageId(7),
            sender: Some(UserId(2000)),
            outgoing: false,
            text: Some(text.to_string()),
            topic_title: None,
        }
    }

    fn owner_command(chat: i64, text: &str) -> MessageEvent {
        MessageEvent {
            sender: Some(OWNER),
            outgoing: true,
            ..message(chat, text)
        }
    }

    #[tokio::test]
    async fn fans_out_to_every_output() {
        let (router, outbound) = router([RouteKey::Plain(ChatId(-100))]);
        for chat in [1, 2, 3] {
            router.route(&owner_command(chat, "/copycat")).await.unwrap();
        }

        let outcome = router.route(&message(-100, "hello")).await.unwrap();
        assert_eq!(outcome.forwarded, 3);
        assert_eq!(outcome.failed, 0);

        let mut forwards = outbound.forwards.lock().unwrap().clone();
        forwards.sort_unstable_by_key(|(_, to, _)| *to);
        assert_eq!(forwards, vec![
            (ChatId(-100), ChatId(1), MessageId(7)),
            (ChatId(-100), ChatId(2), MessageId(7)),
            (ChatId(-100), ChatId(3), MessageId(7)),
        ]);
    }

    #[tokio::test]
    async fn one_failed_destination_leaves_the_rest() {
        let (router, outbound) = router([RouteKey::Plain(ChatId(-100))]);
        for chat in [1, 2, 3] {
            router.route(&owner_command(chat, "/copycat")).await.unwrap();
        }
        outbound.fail_forwards_to.lock().unwrap().insert(ChatId(2));

        let outcome = router.route(&message(-100, "hello")).await.unwrap();
        assert_eq!(outcome.forwarded, 2);
        assert_eq!(outcome.failed, 1);

        let reached: HashSet<ChatId> = outbound
            .forwards
            .lock()
            .unwrap()
            .iter()
            .map(|(_, to, _)| *to)
            .collect();
        assert_eq!(reached, HashSet::from([ChatId(1), ChatId(3)]));
    }

    #[tokio::test]
    async fn outgoing_messages_are_not_routed() {
        let (router, outbound) = router([RouteKey::Plain(ChatId(-100))]);
        router.route(&owner_command(1, "/copycat")).await.unwrap();

        let mut event = message(-100, "hello");
        event.outgoing = true;
        let outcome = router.route(&event).await.unwrap();
        assert_eq!(outcome.forwarded, 0);
        assert!(outbound.forwards.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn untracked_chat_is_ignored() {
        let (router, outbound) = router([RouteKey::Plain(ChatId(-100))]);
        router.route(&owner_command(1, "/copycat")).await.unwrap();

        let outcome = router.route(&message(-200, "hello")).await.unwrap();
        assert_eq!(outcome, RouteOutcome::default());
        assert!(outbound.forwards.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_outputs_means_no_forwards() {
        let (router, outbound) = router([RouteKey::Plain(ChatId(-100))]);
        let outcome = router.route(&message(-100, "hello")).await.unwrap();
        assert_eq!(outcome.forwarded, 0);
        assert!(outbound.forwards.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn toggle_twice_restores_and_confirms_both_ways() {
        let (router, outbound) = router([]);

        let first = router.route(&owner_command(5, "/copycat")).await.unwrap();
        assert_eq!(first.toggled, Some(Toggle::Added));
        assert!(router.outputs().contains(ChatId(5)));

        let second = router.route(&owner_command(5, "/copycat")).await.unwrap();
        assert_eq!(second.toggled, Some(Toggle::Removed));
        assert!(router.outputs().is_empty());

        let sent = outbound.sent.lock().unwrap().clone();
        assert_eq!(sent, vec![
            (ChatId(5), "output set".to_string()),
            (ChatId(5), "output removed".to_string()),
        ]);
    }

    #[tokio::test]
    async fn toggle_works_in_untracked_chats() {
        let (router, _) = router([RouteKey::Plain(ChatId(-100))]);
        let outcome = router.route(&owner_command(5, "/copycat")).await.unwrap();
        assert_eq!(outcome.toggled, Some(Toggle::Added));
    }

    #[tokio::test]
    async fn non_owner_never_toggles() {
        let (router, outbound) = router([]);

        let outcome = router.route(&message(5, "/copycat")).await.unwrap();
        assert_eq!(outcome.toggled, None);

        let mut anonymous = message(5, "/copycat");
        anonymous.sender = None;
        let outcome = router.route(&anonymous).await.unwrap();
        assert_eq!(outcome.toggled, None);

        assert!(router.outputs().is_empty());
        assert!(outbound.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn command_match_is_case_insensitive_and_exact() {
        let (router, _) = router([]);

        let outcome = router.route(&owner_command(5, "/CopyCat")).await.unwrap();
        assert_eq!(outcome.toggled, Some(Toggle::Added));

        for text in ["/copycat extra", " /copycat", "say /copycat", ""] {
            let outcome = router.route(&owner_command(6, text)).await.unwrap();
            assert_eq!(outcome.toggled, None, "{text:?} must not toggle");
        }

        let mut no_text = owner_command(6, "");
        no_text.text = None;
        let outcome = router.route(&no_text).await.unwrap();
        assert_eq!(outcome.toggled, None);
    }

    #[tokio::test]
    async fn toggling_message_in_tracked_chat_still_routes() {
        let (router, outbound) = router([RouteKey::Plain(ChatId(5))]);

        let mut command = owner_command(5, "/copycat");
        command.outgoing = false;
        let outcome = router.route(&command).await.unwrap();

        // Toggled its own chat in, then matched and forwarded to it.
        assert_eq!(outcome.toggled, Some(Toggle::Added));
        assert_eq!(outcome.forwarded, 1);
        assert_eq!(outbound.forwards.lock().unwrap().as_slice(), &[(
            ChatId(5),
            ChatId(5),
            MessageId(7)
        )]);
    }

    #[tokio::test]
    async fn topic_message_matches_topic_key_not_plain() {
        let (router, outbound) = router([RouteKey::topic(ChatId(42), "Bugs")]);
        router.route(&owner_command(1, "/copycat")).await.unwrap();

        let mut topical = message(42, "report");
        topical.topic_title = Some("Bugs".to_string());
        let outcome = router.route(&topical).await.unwrap();
        assert_eq!(outcome.forwarded, 1);

        // Same chat outside the topic: no match.
        let outcome = router.route(&message(42, "report")).await.unwrap();
        assert_eq!(outcome.forwarded, 0);
        assert_eq!(outbound.forwards.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn plain_subscription_ignores_topic_messages() {
        let (router, _) = router([RouteKey::Plain(ChatId(42))]);
        router.route(&owner_command(1, "/copycat")).await.unwrap();

        let mut topical = message(42, "report");
        topical.topic_title = Some("Bugs".to_string());
        let outcome = router.route(&topical).await.unwrap();
        assert_eq!(outcome.forwarded, 0);

        let outcome = router.route(&message(42, "report")).await.unwrap();
        assert_eq!(outcome.forwarded, 1);
    }

    #[tokio::test]
    async fn failed_confirmation_keeps_toggle_and_stays_contained() {
        let (router, outbound) = router([]);
        outbound.fail_sends.store(true, Ordering::SeqCst);

        let result = router.route(&owner_command(5, "/copycat")).await;
        assert!(result.is_err());
        // The toggle itself was applied before the send failed.
        assert!(router.outputs().contains(ChatId(5)));

        // The handler boundary swallows it; the next message still routes.
        router.on_message(owner_command(5, "/copycat")).await;
        outbound.fail_sends.store(false, Ordering::SeqCst);
        let outcome = router.route(&owner_command(6, "/copycat")).await.unwrap();
        assert_eq!(outcome.toggled, Some(Toggle::Added));
    }
}
