//! The engine: pipe ownership, outbound helpers and the read loop

use crate::callbacks::CallbackRegistry;
use crate::config::EngineConfig;
use crate::dispatcher::PendingCall;
use crate::error::EngineError;
use crate::function::HandlerResult;
use crate::panic_capture;
use crate::transport::{LineTransport, Transport};
use crate::value::Value;
use bridge_log::LogEntry;
use bridge_wire::{decode, encode, Envelope, MessageType};
use fork_gate::{ForkGate, GateError};
use serde_json::Value as Json;
use std::rc::Rc;

/// Handler for host `eval` messages
pub type EvalHook = Rc<dyn Fn(&mut Engine, &Value) -> HandlerResult>;

/// Guest side of a bridge session
///
/// All mutable state lives here and is passed by `&mut` into every
/// handler, so callbacks can make nested calls back into the host.
pub struct Engine {
    transport: Box<dyn Transport>,
    config: EngineConfig,
    callbacks: CallbackRegistry,
    gate: ForkGate,
    debug: bool,
    pub(crate) frames: Vec<PendingCall>,
    eval_hook: Option<EvalHook>,
    stop_requested: bool,
}

impl Engine {
    /// Creates an engine over a transport
    pub fn new(transport: impl Transport + 'static, config: EngineConfig) -> Self {
        Self {
            transport: Box::new(transport),
            debug: config.debug,
            config,
            callbacks: CallbackRegistry::new(),
            gate: ForkGate::new(),
            frames: Vec::new(),
            eval_hook: None,
            stop_requested: false,
        }
    }

    /// Creates an engine over standard input and output
    pub fn stdio(config: EngineConfig) -> Self {
        Self::new(LineTransport::stdio(), config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    pub fn callbacks_mut(&mut self) -> &mut CallbackRegistry {
        &mut self.callbacks
    }

    pub fn gate(&self) -> &ForkGate {
        &self.gate
    }

    pub fn is_forked(&self) -> bool {
        self.gate.is_forked()
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Installs the handler for host `eval` messages
    pub fn set_eval_hook<F>(&mut self, hook: F)
    where
        F: Fn(&mut Engine, &Value) -> HandlerResult + 'static,
    {
        self.eval_hook = Some(Rc::new(hook));
    }

    pub(crate) fn eval_hook(&self) -> Option<EvalHook> {
        self.eval_hook.clone()
    }

    // =========================================================================
    // Outbound
    // =========================================================================

    /// Writes one envelope to the host
    pub fn send(&mut self, envelope: &Envelope) -> Result<(), EngineError> {
        let line = encode(envelope)?;
        self.transport.send_line(&line)?;
        Ok(())
    }

    /// Writes a log entry, dropping debug entries while debug is off
    pub fn log(&mut self, entry: LogEntry) -> Result<(), EngineError> {
        if !entry.is_enabled(self.debug) {
            return Ok(());
        }
        self.send(&entry.into_envelope())
    }

    /// Prints to the host's script console
    pub fn message(&mut self, text: impl Into<String>) -> Result<(), EngineError> {
        self.log(LogEntry::info(text))
    }

    /// Prints an error to the host's script console
    pub fn error(&mut self, text: impl Into<String>) -> Result<(), EngineError> {
        self.log(LogEntry::error(text))
    }

    /// Prints a debug message when debug is on
    pub fn debug(&mut self, text: impl Into<String>) -> Result<(), EngineError> {
        self.log(LogEntry::debug(text))
    }

    pub fn enable_debug(&mut self) -> Result<(), EngineError> {
        self.debug = true;
        self.debug("enabled debug")
    }

    pub fn disable_debug(&mut self) -> Result<(), EngineError> {
        self.debug("disabling debug")?;
        self.debug = false;
        Ok(())
    }

    /// Asks the host to evaluate code in its own scripting language
    pub fn eval(&mut self, code: impl Into<String>) -> Result<(), EngineError> {
        self.send(&Envelope::new(MessageType::Eval, Json::String(code.into())))
    }

    /// Asks the host to forget a named item
    pub fn delete(&mut self, name: impl Into<String>) -> Result<(), EngineError> {
        self.send(&Envelope::new(MessageType::Delete, Json::String(name.into())))
    }

    /// Ends the read loop once the current message is handled
    pub fn stop(&mut self) {
        self.stop_requested = true;
    }

    /// Closes registration and tells the host to move off its main thread
    ///
    /// The gate only closes once the `fork` signal has been written.
    pub fn fork(&mut self) -> Result<(), EngineError> {
        if self.gate.is_forked() {
            return Err(GateError::DoubleFork.into());
        }
        self.log(LogEntry::debug("forking"))?;
        self.send(&Envelope::signal(MessageType::Fork))?;
        self.gate.fork()?;
        Ok(())
    }

    // =========================================================================
    // Inbound
    // =========================================================================

    pub(crate) fn transport_receive(&mut self) -> Result<Option<String>, EngineError> {
        Ok(self.transport.receive_line()?)
    }

    /// Runs the read loop until the host stops the engine or closes the pipe
    ///
    /// Forks first when configured to. Fatal errors are returned; every
    /// other error is reported to the host and the loop continues.
    pub fn run(&mut self) -> Result<(), EngineError> {
        panic_capture::install();
        if self.config.fork_first && !self.gate.is_forked() {
            self.fork()?;
        }

        while !self.stop_requested {
            let Some(line) = self.transport.receive_line()? else {
                self.log(LogEntry::debug("pipe closed"))?;
                break;
            };

            match self.dispatch_line(&line) {
                Ok(()) => {}
                Err(err) if err.ends_loop() => {
                    self.log(LogEntry::debug("read loop finished").with_field("reason", &err))?;
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        self.stop_requested = false;
        Ok(())
    }

    /// Decodes and dispatches one inbound line
    ///
    /// A line that does not decode is reported and skipped.
    pub(crate) fn dispatch_line(&mut self, line: &str) -> Result<(), EngineError> {
        match decode(line) {
            Ok(envelope) => self.dispatch_guarded(envelope),
            Err(err) => {
                self.log(LogEntry::error("received invalid message").with_field("reason", &err))?;
                Ok(())
            }
        }
    }

    /// Routes an envelope, reporting recoverable failures to the host
    pub(crate) fn dispatch_guarded(&mut self, envelope: Envelope) -> Result<(), EngineError> {
        match self.guarded(|engine| engine.route(envelope)) {
            Err(err) if err.is_recoverable() => self.report_exception(&err),
            other => other,
        }
    }

    /// Runs `f`, converting a panic into [`EngineError::Panicked`]
    ///
    /// Pending-call frames opened inside `f` are discarded on panic.
    pub(crate) fn guarded<T>(
        &mut self,
        f: impl FnOnce(&mut Engine) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let depth = self.frames.len();
        match panic_capture::catch(|| f(self)) {
            Ok(result) => result,
            Err(report) => {
                self.frames.truncate(depth);
                Err(EngineError::Panicked {
                    message: report.message,
                    trace: report.trace,
                })
            }
        }
    }

    /// Sends an `exception` line and a `traceback` line to the host
    pub fn report_exception(&mut self, err: &EngineError) -> Result<(), EngineError> {
        self.error(format!("exception: {}\n", err))?;

        let mut traceback = err.chain();
        for frame in self.frames.iter().rev() {
            traceback.push_str(&format!("\n  while waiting on: {}", frame));
        }
        self.error(format!("traceback: {}", traceback))
    }
}
