/// Generate a client method for a hand-written service: builds the oneshot
/// reply channel, sends the request variant and flattens both failure paths
/// into the service's error type.
#[macro_export]
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident, Error = $error_type:ty) => {
        impl $client {
            #[tracing::instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, $error_type> {
                tracing::debug!("Sending request");
                let (respond_to, response) = tokio::sync::oneshot::channel();
                self.sender.send($request::$variant {
                    $($param,)*
                    respond_to,
                }).await.map_err(|_| <$error_type>::ActorCommunicationError("Actor closed".to_string()))?;

                response.await.map_err(|_| <$error_type>::ActorCommunicationError("Actor dropped".to_string()))?
            }
        }
    };
}

/// Generate `create_<name>`, `get_<name>` and `require_<name>` for one
/// `ResourceClient` field. The error type must convert from the entity's
/// `FrameworkError` and carry a `NotFound { kind, id }` variant.
#[macro_export]
macro_rules! impl_resource_methods {
    ($client:ident, $field:ident, $entity:ty, $error:ident, $snake:ident) => {
        paste::paste! {
            impl $client {
                #[tracing::instrument(skip(self))]
                pub async fn [<create_ $snake>](
                    &self,
                    params: <$entity as $crate::actor_framework::ActorEntity>::CreateParams,
                ) -> Result<<$entity as $crate::actor_framework::ActorEntity>::Id, $error> {
                    tracing::debug!("Sending request");
                    self.$field.create(params).await.map_err($error::from)
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $snake>](
                    &self,
                    id: <$entity as $crate::actor_framework::ActorEntity>::Id,
                ) -> Result<Option<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.$field.get(id).await.map_err($error::from)
                }

                /// Like the getter, but a missing entity is an error.
                pub async fn [<require_ $snake>](
                    &self,
                    id: <$entity as $crate::actor_framework::ActorEntity>::Id,
                ) -> Result<$entity, $error> {
                    let kind = <$entity as $crate::actor_framework::ActorEntity>::KIND;
                    self.[<get_ $snake>](id.clone())
                        .await?
                        .ok_or_else(|| $error::NotFound { kind, id: id.to_string() })
                }
            }
        }
    };
}
