use ragdesk_core::{update_chat, update_upload, ChatMsg, ChatState, UploadMsg, UploadState};

#[test]
fn idle_upload_ignores_ticks_and_submit() {
    let state = UploadState::new();
    let (next, effects) = update_upload(state.clone(), UploadMsg::PollTick);
    assert_eq!(state, next);
    assert!(effects.is_empty());

    let (next, effects) = update_upload(state.clone(), UploadMsg::SubmitClicked);
    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn blank_message_is_noop() {
    let state = ChatState::new();
    for text in ["", "   ", "\n\t "] {
        let (next, effects) = update_chat(
            state.clone(),
            ChatMsg::SendRequested {
                text: text.to_string(),
                options: Default::default(),
                at: chrono::Utc::now(),
            },
        );
        assert_eq!(state, next);
        assert!(effects.is_empty());
    }
}
