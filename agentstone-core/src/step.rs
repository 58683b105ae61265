//! Step abstraction for Agent Stone workflows.

use std::{fmt::Debug, future::Future, pin::Pin};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::{context::Context, error::Result};

/// Boxed future returned by step closures.
pub type StepFuture<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

/// A named unit of asynchronous work in a workflow.
///
/// A step consumes the context produced by its predecessor and returns a
/// brand-new context for its successor. Steps are declared once and shared by
/// every execution, so they must not keep per-run state.
#[async_trait]
pub trait Step: Send + Sync + Debug {
    /// Execute the step's operation.
    async fn run(&self, context: Context) -> Result<Context>;

    /// Get the name of this step for registration and logging.
    fn name(&self) -> String {
        format!("{self:?}")
    }

    /// Fields this step reads and writes. Empty means unchecked.
    fn contract(&self) -> StepContract {
        StepContract::default()
    }
}

/// Declared input and output fields of a step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StepContract {
    /// Fields that must be present before the step runs.
    pub reads: Vec<String>,
    /// Fields the step guarantees in its output.
    pub writes: Vec<String>,
}

impl StepContract {
    /// Create an empty contract.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the fields read by the step.
    pub fn reads<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reads = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Declare the fields written by the step.
    pub fn writes<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.writes = fields.into_iter().map(Into::into).collect();
        self
    }

    /// First declared input field absent from `context`.
    pub fn missing_read<'a>(&'a self, context: &Context) -> Option<&'a str> {
        self.reads
            .iter()
            .find(|field| !context.contains(field))
            .map(String::as_str)
    }

    /// First declared output field absent from `context`.
    pub fn missing_write<'a>(&'a self, context: &Context) -> Option<&'a str> {
        self.writes
            .iter()
            .find(|field| !context.contains(field))
            .map(String::as_str)
    }
}

/// A step backed by an async closure over the raw context.
pub struct FnStep {
    func: Box<dyn Fn(Context) -> StepFuture<Context> + Send + Sync>,
    name: String,
    contract: StepContract,
}

impl std::fmt::Debug for FnStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStep")
            .field("name", &self.name)
            .field("contract", &self.contract)
            .finish()
    }
}

impl FnStep {
    /// Create a new closure step.
    pub fn new<F, Fut>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Context>> + Send + 'static,
    {
        Self {
            func: Box::new(move |ctx| Box::pin(func(ctx))),
            name: name.into(),
            contract: StepContract::default(),
        }
    }

    /// Attach a field contract.
    pub fn with_contract(mut self, contract: StepContract) -> Self {
        self.contract = contract;
        self
    }
}

#[async_trait]
impl Step for FnStep {
    async fn run(&self, context: Context) -> Result<Context> {
        (self.func)(context).await
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn contract(&self) -> StepContract {
        self.contract.clone()
    }
}

/// A step whose input and output contexts have a fixed shape.
///
/// The incoming context is decoded into `I`; the returned `O` is encoded as
/// the whole outgoing context, so it must serialize to a JSON object.
pub struct TypedStep<I, O> {
    func: Box<dyn Fn(I) -> StepFuture<O> + Send + Sync>,
    name: String,
    contract: StepContract,
}

impl<I, O> std::fmt::Debug for TypedStep<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedStep")
            .field("name", &self.name)
            .field("contract", &self.contract)
            .finish()
    }
}

impl<I, O> TypedStep<I, O>
where
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
{
    /// Create a new typed step.
    pub fn new<F, Fut>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O>> + Send + 'static,
    {
        Self {
            func: Box::new(move |input| Box::pin(func(input))),
            name: name.into(),
            contract: StepContract::default(),
        }
    }

    /// Attach a field contract.
    pub fn with_contract(mut self, contract: StepContract) -> Self {
        self.contract = contract;
        self
    }
}

#[async_trait]
impl<I, O> Step for TypedStep<I, O>
where
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
{
    async fn run(&self, context: Context) -> Result<Context> {
        let input: I = context.decode()?;
        let output = (self.func)(input).await?;
        Context::from_serializable(output)
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn contract(&self) -> StepContract {
        self.contract.clone()
    }
}

/// Helper functions for creating common step types.
pub mod helpers {
    use super::*;

    /// Create a step from an async closure over the raw context.
    pub fn fn_step<F, Fut>(name: impl Into<String>, f: F) -> FnStep
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Context>> + Send + 'static,
    {
        FnStep::new(name, f)
    }

    /// Create a step from an async closure over typed input and output.
    pub fn typed_step<I, O, F, Fut>(name: impl Into<String>, f: F) -> TypedStep<I, O>
    where
        I: DeserializeOwned + Send + 'static,
        O: Serialize + Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O>> + Send + 'static,
    {
        TypedStep::new(name, f)
    }
}
