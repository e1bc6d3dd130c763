//! Inbound message routing

use crate::engine::Engine;
use crate::error::EngineError;
use crate::serializer;
use crate::value::Value;
use bridge_log::LogEntry;
use bridge_wire::{CallbackInvocation, Envelope, MessageType};
use serde_json::Value as Json;

impl Engine {
    /// Routes one inbound envelope that is not an expected `return`
    pub(crate) fn route(&mut self, envelope: Envelope) -> Result<(), EngineError> {
        self.log(
            LogEntry::debug("handling message")
                .with_field("type", &envelope.name)
                .with_field("message", &envelope.message),
        )?;

        match envelope.kind() {
            Some(MessageType::Callback) => match envelope.payload::<CallbackInvocation>() {
                Ok(invocation) => self.handle_callback(invocation),
                Err(err) => {
                    // The host may still be blocked on the id
                    if let Some(id) = envelope.message.get("id").cloned() {
                        self.answer(id, &Value::Null)?;
                    }
                    Err(EngineError::MalformedMessage {
                        name: envelope.name.clone(),
                        reason: err.to_string(),
                    })
                }
            },
            Some(MessageType::Eval) => self.handle_eval(&envelope.message),
            Some(MessageType::Debug) => {
                if envelope.message == Json::Bool(true) {
                    self.enable_debug()
                } else {
                    self.disable_debug()
                }
            }
            Some(MessageType::Stop) => Err(EngineError::Stopped),
            _ => Err(EngineError::UnhandledMessage {
                name: envelope.name,
                message: envelope.message.to_string(),
            }),
        }
    }

    fn handle_eval(&mut self, message: &Json) -> Result<(), EngineError> {
        let Some(hook) = self.eval_hook() else {
            return self.log(LogEntry::warn("no eval handler installed, ignoring eval"));
        };

        let code = serializer::deserialize(message, self.callbacks());
        hook(self, &code)?;
        Ok(())
    }
}
