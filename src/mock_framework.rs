//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! [`create_mock_client`] returns a real [`ResourceClient`] whose mailbox the
//! test holds. The `expect_*` helpers pop the next request, check its kind
//! and hand back the payload plus the reply channel, so a test can script
//! any actor answer: success, a business error, or a dropped reply.

use tokio::sync::mpsc;

use crate::actor_framework::{ActorEntity, Filter, ResourceClient, ResourceRequest, Response};

pub type MockMailbox<T> = mpsc::Receiver<ResourceRequest<T>>;

/// Creates a client and the receiving end of its mailbox.
pub fn create_mock_client<T: ActorEntity>(buffer_size: usize) -> (ResourceClient<T>, MockMailbox<T>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Next message must be a Create request.
pub async fn expect_create<T: ActorEntity>(
    receiver: &mut MockMailbox<T>,
) -> Option<(T::CreateParams, Response<T::Id, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Next message must be a Get request.
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut MockMailbox<T>,
) -> Option<(T::Id, Response<Option<T>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Next message must be a List request.
pub async fn expect_list<T: ActorEntity>(receiver: &mut MockMailbox<T>) -> Option<(Filter<T>, Response<Vec<T>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::List { filter, respond_to }) => Some((filter, respond_to)),
        _ => None,
    }
}

/// Next message must be an Action request.
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut MockMailbox<T>,
) -> Option<(T::Id, T::Action, Response<T::ActionResult, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::FrameworkError;
    use crate::clients::PayoutClient;
    use crate::domain::{Money, OrderId, Payout, PayoutCreate, PayoutId, PayoutStatus, StoreId};
    use crate::payout_actor::PayoutError;
    use chrono::{TimeZone, Utc};

    fn payout(id: &str, store: &str) -> Payout {
        Payout {
            id: PayoutId::new(id),
            seller_id: StoreId::new(store),
            order_ids: vec![OrderId::new("order_1")],
            total_payout: Money::new(90),
            status: PayoutStatus::Pending,
            created_at: Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Payout>(10);
        let payouts = PayoutClient::new(client);

        let create_task = tokio::spawn({
            let payouts = payouts.clone();
            async move {
                payouts
                    .create_payout(PayoutCreate {
                        seller_id: StoreId::new("store_1"),
                        order_ids: vec![OrderId::new("order_1")],
                        total_payout: Money::new(90),
                        created_at: Utc::now(),
                    })
                    .await
            }
        });

        let (params, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(params.total_payout, Money::new(90));
        responder.send(Ok(PayoutId::new("payout_1"))).unwrap();
        assert_eq!(create_task.await.unwrap(), Ok(PayoutId::new("payout_1")));

        // The store filter is applied by the actor, so run it here.
        let list_task = tokio::spawn(async move { payouts.payouts_for_store(StoreId::new("store_1")).await });
        let (filter, responder) = expect_list(&mut receiver).await.expect("Expected List request");
        let all = vec![payout("payout_1", "store_1"), payout("payout_2", "store_2")];
        responder.send(Ok(all.into_iter().filter(|p| filter(p)).collect())).unwrap();

        let listed = list_task.await.unwrap().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, PayoutId::new("payout_1"));
    }

    #[tokio::test]
    async fn test_dropped_reply_is_a_communication_error() {
        let (client, mut receiver) = create_mock_client::<Payout>(10);
        let payouts = PayoutClient::new(client);

        let task = tokio::spawn(async move { payouts.get_payout(PayoutId::new("payout_9")).await });
        let (id, responder) = expect_get(&mut receiver).await.expect("Expected Get request");
        assert_eq!(id, PayoutId::new("payout_9"));
        drop(responder);

        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err, PayoutError::ActorCommunicationError(FrameworkError::<PayoutError>::ActorDropped.to_string()));
    }
}
