//! Almacén en memoria
//!
//! Implementa todos los repositorios sobre un único `RwLock`, de modo que
//! cada operación es atómica respecto a las demás.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AnnouncementRepository, ChecklistItemRepository, CounterOfferRepository, MatchRepository,
    NotificationRepository, PaymentRepository, QuoteRepository, SurchargeOptionRepository,
    UserRepository,
};
use crate::models::announcement::display_order;
use crate::models::{
    Announcement, ChecklistItem, CounterOffer, Match, MatchStatus, Notification, Payment, Quote,
    QuoteChecklistSelection, QuoteStatus, QuoteStop, SurchargeOptionRecord, User,
};
use crate::utils::errors::{conflict_error, not_found_error, AppResult};

#[derive(Default)]
struct MemoryData {
    quotes: HashMap<Uuid, Quote>,
    stops: HashMap<Uuid, Vec<QuoteStop>>,
    checklist: HashMap<Uuid, Vec<QuoteChecklistSelection>>,
    matches: HashMap<Uuid, Match>,
    counter_offers: HashMap<Uuid, CounterOffer>,
    notifications: HashMap<Uuid, Notification>,
    payments: HashMap<Uuid, Payment>,
    announcements: HashMap<Uuid, Announcement>,
    checklist_items: HashMap<Uuid, ChecklistItem>,
    surcharge_options: HashMap<String, SurchargeOptionRecord>,
    users: HashMap<Uuid, User>,
}

impl MemoryData {
    fn has_active_match(&self, quote_id: Uuid) -> bool {
        self.matches
            .values()
            .any(|m| m.quote_id == quote_id && m.is_active())
    }

    fn shipper_quote_ids(&self, shipper_id: Uuid) -> Vec<Uuid> {
        self.quotes
            .values()
            .filter(|q| q.shipper_id == shipper_id)
            .map(|q| q.id)
            .collect()
    }
}

/// Almacén compartido por todos los repositorios en memoria
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<MemoryData>,
}

fn newest_first<T, F>(items: &mut [T], created_at: F)
where
    F: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}

#[async_trait]
impl QuoteRepository for MemoryStore {
    async fn insert(
        &self,
        quote: &Quote,
        stops: &[QuoteStop],
        checklist: &[QuoteChecklistSelection],
    ) -> AppResult<()> {
        let mut guard = self.data.write().await;
        let data = &mut *guard;
        if data.quotes.contains_key(&quote.id) {
            return Err(conflict_error(format!("quote {} already exists", quote.id)));
        }
        data.quotes.insert(quote.id, quote.clone());
        data.stops.insert(quote.id, stops.to_vec());
        data.checklist.insert(quote.id, checklist.to_vec());
        Ok(())
    }

    async fn replace(
        &self,
        quote: &Quote,
        stops: &[QuoteStop],
        checklist: &[QuoteChecklistSelection],
    ) -> AppResult<()> {
        let mut guard = self.data.write().await;
        let data = &mut *guard;
        let current = data
            .quotes
            .get(&quote.id)
            .ok_or_else(|| not_found_error("Quote", quote.id))?;

        // El estado solo lo cambian las transiciones del match
        let mut updated = quote.clone();
        updated.status = current.status;
        data.quotes.insert(quote.id, updated);
        data.stops.insert(quote.id, stops.to_vec());
        data.checklist.insert(quote.id, checklist.to_vec());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Quote>> {
        Ok(self.data.read().await.quotes.get(&id).cloned())
    }

    async fn find_by_shipper(&self, shipper_id: Uuid) -> AppResult<Vec<Quote>> {
        let data = self.data.read().await;
        let mut quotes: Vec<Quote> = data
            .quotes
            .values()
            .filter(|q| q.shipper_id == shipper_id)
            .cloned()
            .collect();
        newest_first(&mut quotes, |q| q.created_at);
        Ok(quotes)
    }

    async fn find_stops(&self, quote_id: Uuid) -> AppResult<Vec<QuoteStop>> {
        let data = self.data.read().await;
        let mut stops = data.stops.get(&quote_id).cloned().unwrap_or_default();
        stops.sort_by_key(|stop| stop.seq);
        Ok(stops)
    }

    async fn find_checklist(&self, quote_id: Uuid) -> AppResult<Vec<QuoteChecklistSelection>> {
        let data = self.data.read().await;
        Ok(data.checklist.get(&quote_id).cloned().unwrap_or_default())
    }

    async fn delete_if_unmatched(&self, id: Uuid) -> AppResult<bool> {
        let mut guard = self.data.write().await;
        let data = &mut *guard;
        if data.has_active_match(id) {
            return Ok(false);
        }
        data.quotes.remove(&id);
        data.stops.remove(&id);
        data.checklist.remove(&id);
        // Los matches cancelados y sus pagos se eliminan con el presupuesto
        let removed: Vec<Uuid> = data
            .matches
            .values()
            .filter(|m| m.quote_id == id)
            .map(|m| m.id)
            .collect();
        data.matches.retain(|_, m| m.quote_id != id);
        data.payments.retain(|_, p| !removed.contains(&p.match_id));
        for notification in data.notifications.values_mut() {
            if notification.match_id.map_or(false, |m| removed.contains(&m)) {
                notification.match_id = None;
            }
        }
        data.counter_offers.retain(|_, o| o.quote_id != id);
        Ok(true)
    }
}

#[async_trait]
impl MatchRepository for MemoryStore {
    async fn insert(&self, record: &Match) -> AppResult<()> {
        let mut guard = self.data.write().await;
        let data = &mut *guard;
        if data.has_active_match(record.quote_id) {
            return Err(conflict_error("an active match already exists for this quote"));
        }
        data.matches.insert(record.id, record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Match>> {
        Ok(self.data.read().await.matches.get(&id).cloned())
    }

    async fn find_active_by_quote(&self, quote_id: Uuid) -> AppResult<Option<Match>> {
        let data = self.data.read().await;
        Ok(data
            .matches
            .values()
            .find(|m| m.quote_id == quote_id && m.is_active())
            .cloned())
    }

    async fn find_open(&self) -> AppResult<Vec<Match>> {
        let data = self.data.read().await;
        let mut matches: Vec<Match> = data
            .matches
            .values()
            .filter(|m| m.is_open_for_drivers())
            .cloned()
            .collect();
        newest_first(&mut matches, |m| m.created_at);
        Ok(matches)
    }

    async fn find_by_driver(&self, driver_id: Uuid) -> AppResult<Vec<Match>> {
        let data = self.data.read().await;
        let mut matches: Vec<Match> = data
            .matches
            .values()
            .filter(|m| m.driver_id == Some(driver_id) && m.status != MatchStatus::Cancelled)
            .cloned()
            .collect();
        newest_first(&mut matches, |m| m.created_at);
        Ok(matches)
    }

    async fn find_by_shipper(&self, shipper_id: Uuid) -> AppResult<Vec<Match>> {
        let data = self.data.read().await;
        let quote_ids = data.shipper_quote_ids(shipper_id);
        let mut matches: Vec<Match> = data
            .matches
            .values()
            .filter(|m| quote_ids.contains(&m.quote_id) && m.status != MatchStatus::Cancelled)
            .cloned()
            .collect();
        newest_first(&mut matches, |m| m.created_at);
        Ok(matches)
    }

    async fn compare_and_update(
        &self,
        expected: &Match,
        updated: &Match,
        quote_status: Option<QuoteStatus>,
    ) -> AppResult<bool> {
        let mut guard = self.data.write().await;
        let data = &mut *guard;
        let current = data
            .matches
            .get(&updated.id)
            .ok_or_else(|| not_found_error("Match", updated.id))?;
        if current.status != expected.status || current.accepted != expected.accepted {
            return Ok(false);
        }

        if let Some(status) = quote_status {
            let quote = data
                .quotes
                .get_mut(&updated.quote_id)
                .ok_or_else(|| not_found_error("Quote", updated.quote_id))?;
            quote.set_status(status);
        }
        data.matches.insert(updated.id, updated.clone());
        Ok(true)
    }
}

#[async_trait]
impl CounterOfferRepository for MemoryStore {
    async fn insert(&self, offer: &CounterOffer) -> AppResult<()> {
        let mut guard = self.data.write().await;
        let data = &mut *guard;
        let duplicate = data.counter_offers.values().any(|o| {
            o.quote_id == offer.quote_id && o.driver_id == offer.driver_id && o.is_pending()
        });
        if duplicate {
            return Err(conflict_error("a pending counter offer already exists for this quote"));
        }
        data.counter_offers.insert(offer.id, offer.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<CounterOffer>> {
        Ok(self.data.read().await.counter_offers.get(&id).cloned())
    }

    async fn exists_pending(&self, quote_id: Uuid, driver_id: Uuid) -> AppResult<bool> {
        let data = self.data.read().await;
        Ok(data
            .counter_offers
            .values()
            .any(|o| o.quote_id == quote_id && o.driver_id == driver_id && o.is_pending()))
    }

    async fn find_by_quote(&self, quote_id: Uuid) -> AppResult<Vec<CounterOffer>> {
        let data = self.data.read().await;
        let mut offers: Vec<CounterOffer> = data
            .counter_offers
            .values()
            .filter(|o| o.quote_id == quote_id)
            .cloned()
            .collect();
        newest_first(&mut offers, |o| o.created_at);
        Ok(offers)
    }

    async fn find_by_driver(&self, driver_id: Uuid) -> AppResult<Vec<CounterOffer>> {
        let data = self.data.read().await;
        let mut offers: Vec<CounterOffer> = data
            .counter_offers
            .values()
            .filter(|o| o.driver_id == driver_id)
            .cloned()
            .collect();
        newest_first(&mut offers, |o| o.created_at);
        Ok(offers)
    }

    async fn update_if_pending(&self, offer: &CounterOffer) -> AppResult<bool> {
        let mut guard = self.data.write().await;
        let data = &mut *guard;
        match data.counter_offers.get(&offer.id) {
            Some(current) if current.is_pending() => {
                data.counter_offers.insert(offer.id, offer.clone());
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(not_found_error("CounterOffer", offer.id)),
        }
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn insert(&self, notification: &Notification) -> AppResult<()> {
        let mut guard = self.data.write().await;
        let data = &mut *guard;
        data.notifications.insert(notification.id, notification.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>> {
        Ok(self.data.read().await.notifications.get(&id).cloned())
    }

    async fn find_by_receiver(&self, receiver_id: Uuid) -> AppResult<Vec<Notification>> {
        let data = self.data.read().await;
        let mut notifications: Vec<Notification> = data
            .notifications
            .values()
            .filter(|n| n.receiver_id == receiver_id)
            .cloned()
            .collect();
        newest_first(&mut notifications, |n| n.created_at);
        Ok(notifications)
    }

    async fn count_unread(&self, receiver_id: Uuid) -> AppResult<i64> {
        let data = self.data.read().await;
        let count = data
            .notifications
            .values()
            .filter(|n| n.receiver_id == receiver_id && !n.is_read)
            .count();
        Ok(count as i64)
    }

    async fn mark_read(&self, id: Uuid) -> AppResult<()> {
        let mut guard = self.data.write().await;
        let data = &mut *guard;
        let notification = data
            .notifications
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Notification", id))?;
        notification.is_read = true;
        Ok(())
    }
}

#[async_trait]
impl PaymentRepository for MemoryStore {
    async fn insert(&self, payment: &Payment) -> AppResult<()> {
        let mut guard = self.data.write().await;
        let data = &mut *guard;
        if data.payments.values().any(|p| p.order_no == payment.order_no) {
            return Err(conflict_error(format!(
                "payment with order number '{}' already exists",
                payment.order_no
            )));
        }
        data.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Payment>> {
        Ok(self.data.read().await.payments.get(&id).cloned())
    }

    async fn find_by_order_no(&self, order_no: &str) -> AppResult<Option<Payment>> {
        let data = self.data.read().await;
        Ok(data.payments.values().find(|p| p.order_no == order_no).cloned())
    }

    async fn find_by_match(&self, match_id: Uuid) -> AppResult<Vec<Payment>> {
        let data = self.data.read().await;
        let mut payments: Vec<Payment> = data
            .payments
            .values()
            .filter(|p| p.match_id == match_id)
            .cloned()
            .collect();
        newest_first(&mut payments, |p| p.created_at);
        Ok(payments)
    }

    async fn find_by_shipper(&self, shipper_id: Uuid) -> AppResult<Vec<Payment>> {
        let data = self.data.read().await;
        let quote_ids = data.shipper_quote_ids(shipper_id);
        let match_ids: Vec<Uuid> = data
            .matches
            .values()
            .filter(|m| quote_ids.contains(&m.quote_id))
            .map(|m| m.id)
            .collect();
        let mut payments: Vec<Payment> = data
            .payments
            .values()
            .filter(|p| match_ids.contains(&p.match_id))
            .cloned()
            .collect();
        newest_first(&mut payments, |p| p.created_at);
        Ok(payments)
    }

    async fn update_if_pending(&self, payment: &Payment) -> AppResult<bool> {
        let mut guard = self.data.write().await;
        let data = &mut *guard;
        match data.payments.get(&payment.id) {
            Some(current) if current.is_pending() => {
                data.payments.insert(payment.id, payment.clone());
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(not_found_error("Payment", payment.id)),
        }
    }
}

#[async_trait]
impl AnnouncementRepository for MemoryStore {
    async fn insert(&self, announcement: &Announcement) -> AppResult<()> {
        let mut guard = self.data.write().await;
        let data = &mut *guard;
        data.announcements.insert(announcement.id, announcement.clone());
        Ok(())
    }

    async fn update(&self, announcement: &Announcement) -> AppResult<()> {
        let mut guard = self.data.write().await;
        let data = &mut *guard;
        if !data.announcements.contains_key(&announcement.id) {
            return Err(not_found_error("Announcement", announcement.id));
        }
        data.announcements.insert(announcement.id, announcement.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.data.write().await.announcements.remove(&id).is_some())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Announcement>> {
        Ok(self.data.read().await.announcements.get(&id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<Announcement>> {
        let data = self.data.read().await;
        let mut announcements: Vec<Announcement> = data.announcements.values().cloned().collect();
        announcements.sort_by(display_order);
        Ok(announcements)
    }

    async fn find_published(&self) -> AppResult<Vec<Announcement>> {
        let data = self.data.read().await;
        let mut announcements: Vec<Announcement> = data
            .announcements
            .values()
            .filter(|a| a.is_published())
            .cloned()
            .collect();
        announcements.sort_by(display_order);
        Ok(announcements)
    }
}

#[async_trait]
impl ChecklistItemRepository for MemoryStore {
    async fn insert(&self, item: &ChecklistItem) -> AppResult<()> {
        let mut guard = self.data.write().await;
        let data = &mut *guard;
        data.checklist_items.insert(item.id, item.clone());
        Ok(())
    }

    async fn find_enabled(&self) -> AppResult<Vec<ChecklistItem>> {
        let data = self.data.read().await;
        let mut items: Vec<ChecklistItem> = data
            .checklist_items
            .values()
            .filter(|item| item.enabled)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.sort_order);
        Ok(items)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<ChecklistItem>> {
        let data = self.data.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| data.checklist_items.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl SurchargeOptionRepository for MemoryStore {
    async fn upsert(&self, record: &SurchargeOptionRecord) -> AppResult<()> {
        let mut guard = self.data.write().await;
        let data = &mut *guard;
        data.surcharge_options.insert(record.code.clone(), record.clone());
        Ok(())
    }

    async fn find_by_codes(&self, codes: &[String]) -> AppResult<Vec<SurchargeOptionRecord>> {
        let data = self.data.read().await;
        Ok(codes
            .iter()
            .filter_map(|code| data.surcharge_options.get(code).cloned())
            .collect())
    }

    async fn find_all(&self) -> AppResult<Vec<SurchargeOptionRecord>> {
        let data = self.data.read().await;
        let mut records: Vec<SurchargeOptionRecord> = data.surcharge_options.values().cloned().collect();
        records.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(records)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: &User) -> AppResult<()> {
        let mut guard = self.data.write().await;
        let data = &mut *guard;
        if data.users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(conflict_error(format!("user with email '{}' already exists", user.email)));
        }
        data.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.data.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QuoteDraft, QuotePrices};
    use crate::pricing::{LoadHandlingMethod, VehicleClass};

    fn sample_quote(shipper_id: Uuid) -> Quote {
        let draft = QuoteDraft {
            origin_address: "서울".into(),
            origin_lat: None,
            origin_lng: None,
            destination_address: "부산".into(),
            destination_lat: None,
            destination_lng: None,
            distance_km: 10,
            weight_kg: Some(100),
            volume_cbm: None,
            vehicle_class: VehicleClass::Ton1,
            vehicle_body_type: None,
            surcharge_codes: vec![],
            cargo_type: None,
            cargo_desc: None,
            desired_price: None,
            allow_combine: false,
            load_method: LoadHandlingMethod::Shipper,
            unload_method: LoadHandlingMethod::Shipper,
            stops: vec![],
            checklist: vec![],
        };
        let prices = QuotePrices {
            base_price: 1,
            extra_price: 0,
            final_price: 1,
            desired_price: 1,
        };
        Quote::new(shipper_id, &draft, prices)
    }

    #[tokio::test]
    async fn test_second_active_match_is_rejected() {
        let store = MemoryStore::default();
        let quote = sample_quote(Uuid::new_v4());
        QuoteRepository::insert(&store, &quote, &[], &[]).await.unwrap();

        MatchRepository::insert(&store, &Match::new(quote.id)).await.unwrap();
        let second = MatchRepository::insert(&store, &Match::new(quote.id)).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_compare_and_update_detects_stale_state() {
        let store = MemoryStore::default();
        let quote = sample_quote(Uuid::new_v4());
        QuoteRepository::insert(&store, &quote, &[], &[]).await.unwrap();
        let original = Match::new(quote.id);
        MatchRepository::insert(&store, &original).await.unwrap();

        let mut first = original.clone();
        first.accept(Uuid::new_v4()).unwrap();
        assert!(store
            .compare_and_update(&original, &first, Some(QuoteStatus::Matched))
            .await
            .unwrap());

        let mut second = original.clone();
        second.accept(Uuid::new_v4()).unwrap();
        assert!(!store
            .compare_and_update(&original, &second, Some(QuoteStatus::Matched))
            .await
            .unwrap());

        let stored = MatchRepository::find_by_id(&store, original.id).await.unwrap().unwrap();
        assert_eq!(stored.driver_id, first.driver_id);
        let quote = QuoteRepository::find_by_id(&store, quote.id).await.unwrap().unwrap();
        assert_eq!(quote.status, QuoteStatus::Matched);
    }

    #[tokio::test]
    async fn test_replace_keeps_status() {
        let store = MemoryStore::default();
        let mut quote = sample_quote(Uuid::new_v4());
        QuoteRepository::insert(&store, &quote, &[], &[]).await.unwrap();

        quote.status = QuoteStatus::Matched;
        quote.distance_km = 20;
        store.replace(&quote, &[], &[]).await.unwrap();

        let stored = QuoteRepository::find_by_id(&store, quote.id).await.unwrap().unwrap();
        assert_eq!(stored.distance_km, 20);
        assert_eq!(stored.status, QuoteStatus::Open);
    }
}
