mod common;

use std::sync::atomic::Ordering;
use uuid::Uuid;

use common::{draft, state_with, test_state, FakeProcessor, ProcessorBehaviour};
use freight_market::models::{Match, PaymentStatus, Principal};
use freight_market::services::NewPayment;
use freight_market::state::AppState;
use freight_market::utils::errors::AppError;

async fn accepted_match(state: &AppState, shipper: &Principal) -> Match {
    let driver = Principal::driver(Uuid::new_v4());
    let quote = state.quotes.create(shipper, &draft()).await.unwrap().quote;
    let record = state.matches.create(shipper, quote.id).await.unwrap();
    state.matches.accept(&driver, record.id).await.unwrap()
}

#[tokio::test]
async fn test_prepare_and_confirm_completes_payment() {
    let state = test_state();
    let shipper = Principal::shipper(Uuid::new_v4());
    let record = accepted_match(&state, &shipper).await;

    let prepared = state
        .payments
        .prepare(&shipper, record.id, 66_000, None)
        .await
        .unwrap();
    assert!(prepared.order_id.starts_with("FRT-"));
    assert_eq!(prepared.order_name, "화물운송 결제");
    assert_eq!(prepared.client_key, "test_ck");

    let paid = state
        .payments
        .confirm(&shipper, "pay_key_1", &prepared.order_id, 66_000)
        .await
        .unwrap();
    assert_eq!(paid.status, PaymentStatus::Completed);
    assert_eq!(paid.pg_ref.as_deref(), Some("pay_key_1"));
    assert!(paid.paid_at.is_some());

    // Un pago ya confirmado no se confirma dos veces
    let again = state
        .payments
        .confirm(&shipper, "pay_key_1", &prepared.order_id, 66_000)
        .await;
    assert!(matches!(again, Err(AppError::Conflict(_))));

    assert_eq!(state.payments.by_match(&shipper, record.id).await.unwrap().len(), 1);
    assert_eq!(state.payments.mine(&shipper).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_amount_mismatch_marks_payment_failed() {
    let processor = FakeProcessor::approving();
    let confirm_calls = processor.confirm_calls.clone();
    let state = state_with(processor);
    let shipper = Principal::shipper(Uuid::new_v4());
    let record = accepted_match(&state, &shipper).await;
    let prepared = state.payments.prepare(&shipper, record.id, 50_000, None).await.unwrap();

    let result = state
        .payments
        .confirm(&shipper, "pay_key", &prepared.order_id, 1_000)
        .await;
    assert!(matches!(result, Err(AppError::InvalidInput(_))));

    let stored = state.payments.get(&shipper, prepared.payment_id).await.unwrap();
    assert_eq!(stored.status, PaymentStatus::Failed);
    assert_eq!(confirm_calls.load(Ordering::SeqCst), 0);

    // Un pago FAILED no se vuelve a procesar, ni siquiera con el importe correcto
    let retry = state
        .payments
        .confirm(&shipper, "pay_key", &prepared.order_id, 50_000)
        .await;
    assert!(matches!(retry, Err(AppError::Conflict(_))));
    assert_eq!(confirm_calls.load(Ordering::SeqCst), 0);

    let stored = state.payments.get(&shipper, prepared.payment_id).await.unwrap();
    assert_eq!(stored.status, PaymentStatus::Failed);
    assert!(stored.paid_at.is_none());
}

#[tokio::test]
async fn test_processor_failures_mark_payment_failed() {
    for (behaviour, unavailable) in [
        (ProcessorBehaviour::Unreachable, true),
        (ProcessorBehaviour::Status("ABORTED"), false),
    ] {
        let state = state_with(FakeProcessor::new(true, behaviour));
        let shipper = Principal::shipper(Uuid::new_v4());
        let record = accepted_match(&state, &shipper).await;
        let prepared = state.payments.prepare(&shipper, record.id, 30_000, None).await.unwrap();

        let result = state
            .payments
            .confirm(&shipper, "pay_key", &prepared.order_id, 30_000)
            .await;
        if unavailable {
            assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
        } else {
            assert!(matches!(result, Err(AppError::InvalidInput(_))));
        }

        let stored = state.payments.get(&shipper, prepared.payment_id).await.unwrap();
        assert_eq!(stored.status, PaymentStatus::Failed);
    }
}

#[tokio::test]
async fn test_prepare_preconditions_and_manual_payments() {
    let state = state_with(FakeProcessor::new(false, ProcessorBehaviour::Approve));
    let shipper = Principal::shipper(Uuid::new_v4());
    let record = accepted_match(&state, &shipper).await;

    let unconfigured = state.payments.prepare(&shipper, record.id, 10_000, None).await;
    assert!(matches!(unconfigured, Err(AppError::InvalidInput(_))));

    let stranger = Principal::shipper(Uuid::new_v4());
    let forbidden = state
        .payments
        .create(&stranger, record.id, NewPayment::default())
        .await;
    assert!(matches!(forbidden, Err(AppError::Forbidden(_))));

    let manual = state
        .payments
        .create(&shipper, record.id, NewPayment::default())
        .await
        .unwrap();
    assert!(manual.order_no.starts_with("ORD-"));
    assert_eq!(manual.status, PaymentStatus::Pending);
    assert!(manual.amount > 0);
}

#[tokio::test]
async fn test_minimum_prepare_amount() {
    let state = test_state();
    let shipper = Principal::shipper(Uuid::new_v4());
    let record = accepted_match(&state, &shipper).await;

    let too_small = state.payments.prepare(&shipper, record.id, 99, None).await;
    assert!(matches!(too_small, Err(AppError::InvalidInput(_))));
    assert!(state.payments.prepare(&shipper, record.id, 100, None).await.is_ok());
}
