use a2a_playground::render_message;
use a2a_playground_protocol::{Message, MessageRole, Part};
use a2a_playground_state::SettingsState;
use proptest::prelude::*;

proptest! {
    #[test]
    fn text_segments_are_recoverable(segments in prop::collection::vec("[^\n\r]{0,40}", 1..6)) {
        let parts = segments.iter().map(|text| Part::text(text.as_str())).collect();
        let message = Message::new(MessageRole::Agent, parts);

        let reply = render_message(&message, &SettingsState::default());
        let recovered: Vec<&str> = reply.text.split('\n').collect();

        prop_assert_eq!(recovered, segments.iter().map(String::as_str).collect::<Vec<_>>());
        prop_assert!(reply.attachments.is_empty());
    }

    #[test]
    fn non_text_parts_never_leak_into_text(
        before in "[a-z ]{1,20}",
        after in "[a-z ]{1,20}",
    ) {
        let parts = vec![
            Part::text(before.as_str()),
            Part::data(serde_json::json!({"secret": "do not show"})),
            Part::text(after.as_str()),
        ];
        let message = Message::new(MessageRole::Agent, parts);

        let reply = render_message(&message, &SettingsState::default());
        prop_assert_eq!(reply.text, format!("{before}\n{after}"));
    }
}
