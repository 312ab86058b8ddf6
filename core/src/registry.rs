// core/src/registry.rs

//! `PipelineRegistry<E>`: pipelines keyed by the type of context they run on.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineResult;
use crate::error::EngineError;
use crate::pipeline::definition::Pipeline;

use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, Level};

/// Holds one pipeline per context type so a request handler only needs to
/// build a context and call `run`.
pub struct PipelineRegistry<E>
where
  E: std::error::Error + From<EngineError> + Send + Sync + 'static,
{
  pipelines: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
  _phantom_err: PhantomData<fn() -> E>,
}

impl<E> PipelineRegistry<E>
where
  E: std::error::Error + From<EngineError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      pipelines: RwLock::new(HashMap::new()),
      _phantom_err: PhantomData,
    }
  }

  /// Registers `pipeline` for `TData`, replacing any previous one.
  pub fn register_pipeline<TData>(&self, pipeline: Pipeline<TData, E>)
  where
    TData: 'static + Send + Sync,
  {
    event!(Level::DEBUG, context_type = %std::any::type_name::<TData>(), "Registering pipeline.");
    self
      .pipelines
      .write()
      .insert(TypeId::of::<TData>(), Arc::new(pipeline));
  }

  pub fn is_registered<TData: 'static>(&self) -> bool {
    self.pipelines.read().contains_key(&TypeId::of::<TData>())
  }

  /// Runs the pipeline registered for `TData`.
  pub async fn run<TData>(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, E>
  where
    TData: 'static + Send + Sync,
  {
    let type_name = std::any::type_name::<TData>();
    let entry = self.pipelines.read().get(&TypeId::of::<TData>()).cloned();

    let pipeline = entry
      .and_then(|any| any.downcast::<Pipeline<TData, E>>().ok())
      .ok_or_else(|| {
        event!(Level::ERROR, "No pipeline registered for context type {}.", type_name);
        E::from(EngineError::NotRegistered {
          type_name: type_name.to_string(),
        })
      })?;

    pipeline.run(ctx_data).await
  }
}

impl<E> Default for PipelineRegistry<E>
where
  E: std::error::Error + From<EngineError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}
