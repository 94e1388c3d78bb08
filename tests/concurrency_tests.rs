mod common;

use futures::future::join_all;
use uuid::Uuid;

use common::{draft, test_state};
use freight_market::models::{Principal, QuoteStatus};
use freight_market::utils::errors::AppError;

const CONTENDERS: usize = 16;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_only_one_driver_wins_an_accept_race() {
    let state = test_state();
    let shipper = Principal::shipper(Uuid::new_v4());
    let quote = state.quotes.create(&shipper, &draft()).await.unwrap().quote;
    let record = state.matches.create(&shipper, quote.id).await.unwrap();

    let attempts = (0..CONTENDERS).map(|_| {
        let state = state.clone();
        let driver = Principal::driver(Uuid::new_v4());
        tokio::spawn(async move { state.matches.accept(&driver, record.id).await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let winners = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(results
        .iter()
        .filter_map(|result| result.as_ref().err())
        .all(|error| matches!(error, AppError::Conflict(_))));

    let quote = state.quotes.get(&shipper, quote.id).await.unwrap().quote;
    assert_eq!(quote.status, QuoteStatus::Matched);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_match_creation_yields_one_active_match() {
    let state = test_state();
    let shipper = Principal::shipper(Uuid::new_v4());
    let quote = state.quotes.create(&shipper, &draft()).await.unwrap().quote;

    let attempts = (0..CONTENDERS).map(|_| {
        let state = state.clone();
        tokio::spawn(async move { state.matches.create(&shipper, quote.id).await })
    });
    let created = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .filter(|result| result.is_ok())
        .count();

    assert_eq!(created, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_offers_from_one_driver_keep_a_single_pending() {
    let state = test_state();
    let shipper = Principal::shipper(Uuid::new_v4());
    let driver = Principal::driver(Uuid::new_v4());
    let quote = state.quotes.create(&shipper, &draft()).await.unwrap().quote;

    let attempts = (0..CONTENDERS).map(|i| {
        let state = state.clone();
        let price = 60_000 + i as i64 * 1_000;
        tokio::spawn(async move { state.counter_offers.create(&driver, quote.id, price, None).await })
    });
    let created = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .filter(|result| result.is_ok())
        .count();

    assert_eq!(created, 1);
    assert_eq!(state.counter_offers.mine(&driver).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancel_and_accept_race_leaves_consistent_state() {
    let state = test_state();
    let shipper = Principal::shipper(Uuid::new_v4());
    let driver = Principal::driver(Uuid::new_v4());
    let quote = state.quotes.create(&shipper, &draft()).await.unwrap().quote;
    let record = state.matches.create(&shipper, quote.id).await.unwrap();

    let accept = {
        let state = state.clone();
        tokio::spawn(async move { state.matches.accept(&driver, record.id).await })
    };
    let cancel = {
        let state = state.clone();
        tokio::spawn(async move { state.matches.cancel(&shipper, record.id).await })
    };
    let accepted = accept.await.unwrap();
    cancel.await.unwrap().unwrap();

    // La cancelación siempre gana al final; el presupuesto vuelve a OPEN
    let quote = state.quotes.get(&shipper, quote.id).await.unwrap().quote;
    assert_eq!(quote.status, QuoteStatus::Open);
    if let Err(error) = accepted {
        assert!(matches!(error, AppError::Conflict(_)));
    }
}
