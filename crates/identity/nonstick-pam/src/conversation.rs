//! Bridges PAM's C-string conversation callbacks onto [`Conversation`].

use nonstick_core::{Conversation, ConversationError, Style};
use std::ffi::{CStr, CString};
use tracing::warn;

/// Relays PAM conversation requests to a [`Conversation`].
///
/// The first failure is kept so the engine can report why the transaction was
/// abandoned; PAM itself only sees a generic conversation error.
pub struct ConversationRelay {
    inner: Box<dyn Conversation>,
    failure: Option<ConversationError>,
}

impl ConversationRelay {
    pub fn new(inner: Box<dyn Conversation>) -> Self {
        Self {
            inner,
            failure: None,
        }
    }

    /// Present `message` and, for prompt styles, return the answer as a C string.
    pub fn relay(&mut self, style: Style, message: &CStr) -> Result<Option<CString>, ConversationError> {
        let text = message.to_string_lossy();
        let result = self
            .inner
            .respond(style, &text)
            .and_then(|answer| match answer {
                Some(answer) => CString::new(answer)
                    .map(Some)
                    .map_err(|_| ConversationError::Delivery("reply contains a NUL byte".into())),
                None if style.expects_reply() => Err(ConversationError::Delivery(
                    "prompt answered without a reply".into(),
                )),
                None => Ok(None),
            });

        if let Err(e) = &result {
            warn!("PAM conversation failed: {}", e);
            if self.failure.is_none() {
                self.failure = Some(clone_error(e));
            }
        }
        result
    }

    /// The first failure seen by this relay, if any.
    pub fn failure(&self) -> Option<&ConversationError> {
        self.failure.as_ref()
    }

    pub fn take_failure(&mut self) -> Option<ConversationError> {
        self.failure.take()
    }
}

fn clone_error(error: &ConversationError) -> ConversationError {
    match error {
        ConversationError::Closed => ConversationError::Closed,
        ConversationError::TimedOut => ConversationError::TimedOut,
        ConversationError::Delivery(message) => ConversationError::Delivery(message.clone()),
    }
}

#[cfg(feature = "libpam")]
mod handler {
    use super::ConversationRelay;
    use nonstick_core::Style;
    use pam_client::{ConversationHandler, ErrorCode};
    use std::ffi::{CStr, CString};

    impl ConversationRelay {
        fn prompt(&mut self, style: Style, msg: &CStr) -> Result<CString, ErrorCode> {
            match self.relay(style, msg) {
                Ok(Some(answer)) => Ok(answer),
                Ok(None) | Err(_) => Err(ErrorCode::CONV_ERR),
            }
        }
    }

    impl ConversationHandler for ConversationRelay {
        fn prompt_echo_on(&mut self, msg: &CStr) -> Result<CString, ErrorCode> {
            self.prompt(Style::PromptEchoOn, msg)
        }

        fn prompt_echo_off(&mut self, msg: &CStr) -> Result<CString, ErrorCode> {
            self.prompt(Style::PromptEchoOff, msg)
        }

        fn text_info(&mut self, msg: &CStr) {
            let _ = self.relay(Style::TextInfo, msg);
        }

        fn error_msg(&mut self, msg: &CStr) {
            let _ = self.relay(Style::ErrorMsg, msg);
        }
    }
}
