use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, Params, and Actions)
// =============================================================================

/// Trait that any domain entity must implement to be managed by [`ResourceActor`].
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// Human readable entity kind, used in logs and not-found errors.
    const KIND: &'static str;

    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + 'static;
    type CreateParams: Send + Debug + 'static;
    type UpdateParams: Send + Debug + 'static;

    // --- Custom Actions ---
    type Action: Send + Debug + 'static;
    type ActionResult: Send + Debug + 'static;

    /// Business error raised by the hooks below.
    type Error: std::error::Error + Clone + Send + Sync + 'static;

    fn id(&self) -> &Self::Id;

    /// Construct the full entity from the assigned id and the creation params.
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
    fn on_update(&mut self, update: Self::UpdateParams) -> Result<(), Self::Error>;
    fn on_delete(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler ---

    /// Handle a custom domain-specific action.
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;
}

/// Errors surfaced by [`ResourceClient`]: either the entity rejected the
/// request, or the request never reached a live actor.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError<E> {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: &'static str, id: String },
    #[error("{0}")]
    Entity(E),
    #[error("actor closed")]
    ActorClosed,
    #[error("actor dropped the response channel")]
    ActorDropped,
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T, E> = oneshot::Sender<Result<T, FrameworkError<E>>>;

/// Predicate used by [`ResourceRequest::List`].
pub type Filter<T> = Box<dyn Fn(&T) -> bool + Send>;

pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T::Id, T::Error>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>, T::Error>,
    },
    List {
        filter: Filter<T>,
        respond_to: Response<Vec<T>, T::Error>,
    },
    Update {
        id: T::Id,
        update: T::UpdateParams,
        respond_to: Response<T, T::Error>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<(), T::Error>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult, T::Error>,
    },
}

// =============================================================================
// 3. ID ASSIGNMENT
// =============================================================================

pub type IdAssigner<T> =
    Box<dyn Fn(&<T as ActorEntity>::CreateParams) -> <T as ActorEntity>::Id + Send + Sync>;

/// Ids of the form `{prefix}_{n}` with `n` counting up from 1.
pub fn sequential_ids<P, I>(prefix: &'static str) -> impl Fn(&P) -> I + Send + Sync
where
    I: From<String>,
{
    let counter = Arc::new(AtomicU64::new(1));
    move |_: &P| {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        I::from(format!("{}_{}", prefix, n))
    }
}

// =============================================================================
// 4. THE GENERIC ACTOR SERVER
// =============================================================================

/// Single-writer owner of every entity of one kind.
///
/// Requests are handled strictly one at a time, so a hook that reads and
/// writes an entity is an atomic conditional update from the point of view
/// of every client.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    assign_id: IdAssigner<T>,
}

impl<T: ActorEntity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        assign_id: impl Fn(&T::CreateParams) -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            assign_id: Box::new(assign_id),
        };
        (actor, ResourceClient::new(sender))
    }

    #[instrument(name = "resource_actor", skip(self), fields(kind = T::KIND))]
    pub async fn run(mut self) {
        info!("Actor starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.handle_create(params));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::List { filter, respond_to } => {
                    let items = self.store.values().filter(|item| filter(item)).cloned().collect();
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update { id, update, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, update));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let _ = respond_to.send(self.handle_action(id, action));
                }
            }
        }
        info!(remaining = self.store.len(), "Actor stopped");
    }

    fn handle_create(&mut self, params: T::CreateParams) -> Result<T::Id, FrameworkError<T::Error>> {
        let id = (self.assign_id)(&params);
        if self.store.contains_key(&id) {
            warn!(id = %id, "Create rejected: id already taken");
            return Err(FrameworkError::AlreadyExists { kind: T::KIND, id: id.to_string() });
        }
        let mut item = T::from_create_params(id.clone(), params).map_err(FrameworkError::Entity)?;
        item.on_create().map_err(FrameworkError::Entity)?;
        self.store.insert(id.clone(), item);
        debug!(id = %id, "Created");
        Ok(id)
    }

    // Hooks mutate a scratch copy; the stored entity only changes on success.
    fn handle_update(&mut self, id: T::Id, update: T::UpdateParams) -> Result<T, FrameworkError<T::Error>> {
        let item = self.store.get_mut(&id).ok_or_else(|| not_found::<T>(&id))?;
        let mut next = item.clone();
        next.on_update(update).map_err(FrameworkError::Entity)?;
        *item = next.clone();
        Ok(next)
    }

    fn handle_delete(&mut self, id: T::Id) -> Result<(), FrameworkError<T::Error>> {
        let item = self.store.get(&id).ok_or_else(|| not_found::<T>(&id))?;
        item.on_delete().map_err(FrameworkError::Entity)?;
        self.store.remove(&id);
        debug!(id = %id, "Deleted");
        Ok(())
    }

    fn handle_action(&mut self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError<T::Error>> {
        let item = self.store.get_mut(&id).ok_or_else(|| not_found::<T>(&id))?;
        let mut next = item.clone();
        let result = next.handle_action(action).map_err(FrameworkError::Entity)?;
        *item = next;
        Ok(result)
    }
}

fn not_found<T: ActorEntity>(id: &T::Id) -> FrameworkError<T::Error> {
    FrameworkError::NotFound { kind: T::KIND, id: id.to_string() }
}

// =============================================================================
// 5. THE GENERIC CLIENT
// =============================================================================

pub struct ResourceClient<T: ActorEntity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

// Derived Clone would require `T: Clone` on the handle itself.
impl<T: ActorEntity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone() }
    }
}

impl<T: ActorEntity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R, T::Error>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError<T::Error>> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T::Id, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn list(
        &self,
        filter: impl Fn(&T) -> bool + Send + 'static,
    ) -> Result<Vec<T>, FrameworkError<T::Error>> {
        let filter: Filter<T> = Box::new(filter);
        self.request(|respond_to| ResourceRequest::List { filter, respond_to }).await
    }

    pub async fn update(&self, id: T::Id, update: T::UpdateParams) -> Result<T, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Update { id, update, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }
}

// =============================================================================
// 6. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // --- Domain Definition ---

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        id: String,
        value: u32,
        limit: u32,
    }

    #[derive(Debug)]
    struct CounterCreate {
        key: Option<String>,
        limit: u32,
    }

    #[derive(Debug)]
    enum CounterAction {
        Add(u32),
        // Applies the increment and then fails, to prove the store is untouched.
        AddThenFail(u32),
    }

    #[derive(Debug, Clone, Error, PartialEq)]
    enum CounterError {
        #[error("limit exceeded")]
        LimitExceeded,
        #[error("counters are immutable")]
        Immutable,
    }

    impl ActorEntity for Counter {
        const KIND: &'static str = "Counter";
        type Id = String;
        type CreateParams = CounterCreate;
        type UpdateParams = ();
        type Action = CounterAction;
        type ActionResult = u32;
        type Error = CounterError;

        fn id(&self) -> &String {
            &self.id
        }

        fn from_create_params(id: String, params: CounterCreate) -> Result<Self, CounterError> {
            Ok(Self { id, value: 0, limit: params.limit })
        }

        fn on_update(&mut self, _update: ()) -> Result<(), CounterError> {
            Err(CounterError::Immutable)
        }

        fn handle_action(&mut self, action: CounterAction) -> Result<u32, CounterError> {
            match action {
                CounterAction::Add(n) => {
                    if self.value + n > self.limit {
                        return Err(CounterError::LimitExceeded);
                    }
                    self.value += n;
                    Ok(self.value)
                }
                CounterAction::AddThenFail(n) => {
                    self.value += n;
                    Err(CounterError::LimitExceeded)
                }
            }
        }
    }

    fn start(limit_ids: &'static str) -> ResourceClient<Counter> {
        let fallback = sequential_ids::<CounterCreate, String>(limit_ids);
        let (actor, client) = ResourceActor::<Counter>::new(16, move |p: &CounterCreate| {
            p.key.clone().unwrap_or_else(|| fallback(p))
        });
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn test_sequential_and_derived_ids() {
        let client = start("counter");
        let a = client.create(CounterCreate { key: None, limit: 1 }).await.unwrap();
        let b = client.create(CounterCreate { key: None, limit: 1 }).await.unwrap();
        assert_eq!(a, "counter_1");
        assert_eq!(b, "counter_2");

        let keyed = client.create(CounterCreate { key: Some("k".into()), limit: 1 }).await.unwrap();
        assert_eq!(keyed, "k");
        let dup = client.create(CounterCreate { key: Some("k".into()), limit: 1 }).await;
        assert!(matches!(dup, Err(FrameworkError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_failed_action_leaves_entity_untouched() {
        let client = start("counter");
        let id = client.create(CounterCreate { key: None, limit: 5 }).await.unwrap();

        assert_eq!(client.perform_action(id.clone(), CounterAction::Add(3)).await.unwrap(), 3);
        let err = client.perform_action(id.clone(), CounterAction::AddThenFail(1)).await.unwrap_err();
        assert_eq!(err, FrameworkError::Entity(CounterError::LimitExceeded));

        let counter = client.get(id.clone()).await.unwrap().unwrap();
        assert_eq!(counter.value, 3);

        let update = client.update(id, ()).await;
        assert_eq!(update, Err(FrameworkError::Entity(CounterError::Immutable)));
    }

    #[tokio::test]
    async fn test_concurrent_actions_are_serialized() {
        let client = start("counter");
        let id = client.create(CounterCreate { key: None, limit: 10 }).await.unwrap();

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let client = client.clone();
            let id = id.clone();
            tasks.push(tokio::spawn(async move { client.perform_action(id, CounterAction::Add(1)).await }));
        }
        let mut accepted = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 10);
        assert_eq!(client.get(id).await.unwrap().unwrap().value, 10);
    }

    #[tokio::test]
    async fn test_list_delete_and_not_found() {
        let client = start("counter");
        let a = client.create(CounterCreate { key: None, limit: 1 }).await.unwrap();
        client.create(CounterCreate { key: None, limit: 9 }).await.unwrap();

        let big = client.list(|c: &Counter| c.limit > 5).await.unwrap();
        assert_eq!(big.len(), 1);

        client.delete(a.clone()).await.unwrap();
        assert_eq!(client.get(a.clone()).await.unwrap(), None);
        assert!(matches!(
            client.perform_action(a, CounterAction::Add(1)).await,
            Err(FrameworkError::NotFound { kind: "Counter", .. })
        ));
    }
}
