//! Shell session state that persists across input lines.
//!
//! The open-transaction flag, the transaction handle and the prompt text
//! change together through [`ShellState::open`] and [`ShellState::close`],
//! so a handle is held exactly when the flag is set.

use ledgershell_core::{Session, TransactionHandle};

/// Prompt used when no template is configured.
pub const DEFAULT_PROMPT: &str = "$LEDGER$ACTIVE_TRANSACTION> ";

/// Prompt template.
///
/// Recognized placeholders: `$LEDGER`, `$REGION` and `$ACTIVE_TRANSACTION`,
/// the last of which renders as `(tx: <id>)` while a transaction is open
/// and as nothing otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    template: String,
    ledger: String,
    region: String,
}

impl Prompt {
    /// Build a prompt for `ledger`.
    pub fn new(template: impl Into<String>, ledger: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            ledger: ledger.into(),
            region: String::new(),
        }
    }

    /// Set the region substituted for `$REGION`.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Render with the given open transaction id, if any.
    pub fn render(&self, transaction_id: Option<&str>) -> String {
        let active = match transaction_id {
            Some(id) => format!("(tx: {})", id),
            None => String::new(),
        };
        self.template
            .replace("$LEDGER", &self.ledger)
            .replace("$REGION", &self.region)
            .replace("$ACTIVE_TRANSACTION", &active)
    }
}

impl Default for Prompt {
    fn default() -> Self {
        Prompt::new(DEFAULT_PROMPT, "")
    }
}

/// Mutable shell state, one per shell invocation.
pub struct ShellState<S: Session> {
    interactive: bool,
    session: Option<S>,
    transaction: Option<S::Transaction>,
    prompt: Prompt,
    prompt_text: String,
}

impl<S: Session> ShellState<S> {
    /// Fresh state: nothing open, default prompt rendered.
    pub fn new(prompt: Prompt) -> Self {
        let prompt_text = prompt.render(None);
        Self {
            interactive: false,
            session: None,
            transaction: None,
            prompt,
            prompt_text,
        }
    }

    /// Whether an interactive transaction is open.
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Current prompt text.
    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }

    /// Replace the prompt template and re-render.
    pub fn set_prompt(&mut self, prompt: Prompt) {
        self.prompt = prompt;
        self.refresh_prompt();
    }

    /// Id of the open transaction.
    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction.as_ref().map(|tx| tx.id())
    }

    /// Whether a session is held.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Mark `transaction` as the open interactive transaction.
    pub fn open(&mut self, transaction: S::Transaction) {
        self.interactive = true;
        self.transaction = Some(transaction);
        self.refresh_prompt();
    }

    /// Take the open transaction, clearing the flag and prompt with it.
    pub fn take_transaction(&mut self) -> Option<S::Transaction> {
        let transaction = self.transaction.take();
        self.interactive = false;
        self.refresh_prompt();
        transaction
    }

    /// Clear the open transaction. Calling it when nothing is open is a no-op.
    ///
    /// A transaction handle still held here is dropped without being
    /// resolved; callers abort it first when that matters.
    pub fn close(&mut self) {
        if !self.interactive && self.transaction.is_none() {
            return;
        }
        self.interactive = false;
        self.transaction = None;
        self.refresh_prompt();
    }

    /// Store a session unless one is already held.
    pub fn hold_session(&mut self, session: S) {
        if self.session.is_none() {
            self.session = Some(session);
        }
    }

    /// Borrow the held session.
    pub fn session_mut(&mut self) -> Option<&mut S> {
        self.session.as_mut()
    }

    /// Close and drop the held session, if any.
    pub fn release_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close();
        }
    }

    fn refresh_prompt(&mut self) {
        self.prompt_text = self.prompt.render(self.transaction_id());
    }
}

impl<S: Session> std::fmt::Debug for ShellState<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellState")
            .field("interactive", &self.interactive)
            .field("session", &self.session.is_some())
            .field("transaction", &self.transaction_id())
            .field("prompt_text", &self.prompt_text)
            .finish()
    }
}
