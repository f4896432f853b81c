//! Worker-thread transaction execution.
//!
//! A [`TransactionWorker`] owns a session and transaction on a dedicated
//! thread and is driven over a pair of channels. Each request blocks until
//! its response arrives, so the queue never holds more than one request.
//! The worker implements [`TransactionHandle`], so the runner drives it the
//! same way as an in-thread transaction.
//!
//! ```text
//!   caller                       worker thread
//!   ──────                       ─────────────
//!   Request{Start}     ──────►   get_session + start_transaction
//!                      ◄──────   Response{Start, Started{id}}
//!   Request{Execute,s} ──────►   execute_statement(s)
//!                      ◄──────   Response{Execute, Results(..)}
//!   Request{Commit}    ──────►   commit
//!                      ◄──────   Response{Commit, Done}
//! ```

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use ledgershell_core::{
    Error, Result, Session, SessionProvider, StatementResults, TransactionHandle,
};

/// Operation requested of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Acquire a session and start a transaction.
    Start,
    /// Execute one statement in the transaction.
    Execute,
    /// Commit the transaction.
    Commit,
    /// Abort the transaction.
    Abort,
}

/// Payload of a successful response.
#[derive(Debug)]
pub enum Output {
    /// The transaction started.
    Started {
        /// Id of the new transaction.
        transaction_id: String,
    },
    /// Results of an executed statement.
    Results(StatementResults),
    /// Commit or abort completed.
    Done,
}

/// A request sent to the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// What to do.
    pub command: Command,
    /// Statement text, for [`Command::Execute`].
    pub statement: Option<String>,
}

/// The worker's reply, tagged with the command it answers.
///
/// A failure travels as the `Err` side of `output` and is inspected by the
/// caller when it reads the response.
#[derive(Debug)]
pub struct Response {
    /// Command this response answers.
    pub command: Command,
    /// Outcome of the command.
    pub output: Result<Output>,
}

fn worker_gone() -> Error {
    Error::invalid_state("transaction worker has exited")
}

/// A transaction running on its own thread.
pub struct TransactionWorker {
    id: String,
    requests: Option<Sender<Request>>,
    responses: Receiver<Response>,
    handle: Option<JoinHandle<()>>,
    resolved: bool,
}

impl TransactionWorker {
    /// Spawn a worker that opens a session on `provider` and starts a transaction.
    pub fn spawn<P>(provider: P) -> Result<Self>
    where
        P: SessionProvider + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel();
        let (response_tx, response_rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("ledgershell-tx-worker".into())
            .spawn(move || worker_loop(provider, request_rx, response_tx))?;

        let mut worker = Self::from_parts(request_tx, response_rx, Some(handle));
        match worker.round_trip(Command::Start, None)? {
            Output::Started { transaction_id } => {
                worker.id = transaction_id;
                Ok(worker)
            }
            other => {
                worker.resolved = true;
                Err(Error::invalid_state(format!(
                    "unexpected start output: {:?}",
                    other
                )))
            }
        }
    }

    pub(crate) fn from_parts(
        requests: Sender<Request>,
        responses: Receiver<Response>,
        handle: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            id: String::new(),
            requests: Some(requests),
            responses,
            handle,
            resolved: false,
        }
    }

    fn round_trip(&mut self, command: Command, statement: Option<String>) -> Result<Output> {
        let requests = self.requests.as_ref().ok_or_else(worker_gone)?;
        requests
            .send(Request { command, statement })
            .map_err(|_| worker_gone())?;
        let response = self.responses.recv().map_err(|_| worker_gone())?;
        if response.command != command {
            return Err(Error::invalid_state(format!(
                "expected a {:?} response, received {:?}",
                command, response.command
            )));
        }
        response.output
    }

    fn resolve(&mut self, command: Command) -> Result<()> {
        match self.round_trip(command, None)? {
            Output::Done => {
                self.resolved = true;
                Ok(())
            }
            other => Err(Error::invalid_state(format!(
                "unexpected {:?} output: {:?}",
                command, other
            ))),
        }
    }
}

impl TransactionHandle for TransactionWorker {
    fn id(&self) -> &str {
        &self.id
    }

    fn execute_statement(&mut self, statement: &str) -> Result<StatementResults> {
        match self.round_trip(Command::Execute, Some(statement.to_string()))? {
            Output::Results(results) => Ok(results),
            other => Err(Error::invalid_state(format!(
                "unexpected execute output: {:?}",
                other
            ))),
        }
    }

    fn commit(&mut self) -> Result<()> {
        self.resolve(Command::Commit)
    }

    fn abort(&mut self) -> Result<()> {
        self.resolve(Command::Abort)
    }
}

impl Drop for TransactionWorker {
    fn drop(&mut self) {
        if !self.resolved {
            if let Err(e) = self.resolve(Command::Abort) {
                tracing::debug!(target: "ledgershell::worker", error = %e, "Abort on drop failed");
            }
        }
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!(target: "ledgershell::worker", "Transaction worker panicked");
            }
        }
    }
}

impl std::fmt::Debug for TransactionWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionWorker")
            .field("id", &self.id)
            .field("resolved", &self.resolved)
            .finish()
    }
}

fn worker_loop<P: SessionProvider>(
    provider: P,
    requests: Receiver<Request>,
    responses: Sender<Response>,
) {
    tracing::debug!(
        target: "ledgershell::worker",
        ledger = %provider.ledger_name(),
        "Worker started"
    );
    let mut session: Option<P::Session> = None;
    let mut transaction: Option<<P::Session as Session>::Transaction> = None;

    for request in requests.iter() {
        let output = match request.command {
            Command::Start => start(&provider, &mut session, &mut transaction),
            Command::Execute => match (transaction.as_mut(), request.statement.as_deref()) {
                (Some(tx), Some(statement)) => tx.execute_statement(statement).map(Output::Results),
                (None, _) => Err(Error::invalid_state("no transaction on worker")),
                (_, None) => Err(Error::invalid_state("execute request without a statement")),
            },
            Command::Commit => finish(&mut transaction, |tx| tx.commit()),
            Command::Abort => finish(&mut transaction, |tx| tx.abort()),
        };
        let response = Response {
            command: request.command,
            output,
        };
        if responses.send(response).is_err() {
            break;
        }
    }

    if let Some(mut tx) = transaction.take() {
        let _ = tx.abort();
    }
    if let Some(mut session) = session.take() {
        session.close();
    }
    tracing::debug!(target: "ledgershell::worker", "Worker exited");
}

fn start<P: SessionProvider>(
    provider: &P,
    session: &mut Option<P::Session>,
    transaction: &mut Option<<P::Session as Session>::Transaction>,
) -> Result<Output> {
    if transaction.is_some() {
        return Err(Error::invalid_state("worker already owns a transaction"));
    }
    if session.is_none() {
        *session = Some(provider.get_session()?);
    }
    let session = session.as_mut().ok_or_else(|| Error::invalid_state("no session on worker"))?;
    let tx = session.start_transaction()?;
    let transaction_id = tx.id().to_string();
    *transaction = Some(tx);
    Ok(Output::Started { transaction_id })
}

fn finish<T, F>(transaction: &mut Option<T>, op: F) -> Result<Output>
where
    T: TransactionHandle,
    F: FnOnce(&mut T) -> Result<()>,
{
    let tx = transaction
        .as_mut()
        .ok_or_else(|| Error::invalid_state("no transaction on worker"))?;
    op(tx)?;
    transaction.take();
    Ok(Output::Done)
}

/// Provider whose sessions run transactions on worker threads.
#[derive(Debug, Clone)]
pub struct WorkerProvider<P> {
    inner: P,
}

impl<P> WorkerProvider<P>
where
    P: SessionProvider + Clone + Send + 'static,
{
    /// Wrap `inner`.
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P> SessionProvider for WorkerProvider<P>
where
    P: SessionProvider + Clone + Send + 'static,
{
    type Session = WorkerSession<P>;

    fn get_session(&self) -> Result<WorkerSession<P>> {
        Ok(WorkerSession {
            provider: self.inner.clone(),
            session: self.inner.get_session()?,
        })
    }

    fn ledger_name(&self) -> &str {
        self.inner.ledger_name()
    }
}

/// Session of a [`WorkerProvider`].
///
/// Statements outside a transaction run on the calling thread.
pub struct WorkerSession<P: SessionProvider> {
    provider: P,
    session: P::Session,
}

impl<P> Session for WorkerSession<P>
where
    P: SessionProvider + Clone + Send + 'static,
{
    type Transaction = TransactionWorker;

    fn execute(&mut self, statement: &str) -> Result<StatementResults> {
        self.session.execute(statement)
    }

    fn start_transaction(&mut self) -> Result<TransactionWorker> {
        TransactionWorker::spawn(self.provider.clone())
    }

    fn close(&mut self) {
        self.session.close();
    }
}
