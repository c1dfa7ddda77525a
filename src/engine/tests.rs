//! Engine Integration Tests
//!
//! Drives the sync engine end to end against the in-memory store and
//! a stubbed catalog: seeding, drag placement, capacity rejection,
//! snapshot merging, and the optimistic failure path.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::context::AppContext;
    use crate::domain::{
        DecorKind, DomainError, DomainResult, ItemKind, Placement, ShelfIndex,
    };
    use crate::engine::{DragController, DropTarget, Notice, Session, MAX_TRAY_ITEMS};
    use crate::repository::{
        AnonymousIdentity, CatalogClient, DocumentStore, MemoryStore, Volume,
    };

    struct StubCatalog {
        volumes: Vec<Volume>,
        fail: bool,
    }

    impl StubCatalog {
        fn with_volumes(volumes: Vec<Volume>) -> Self {
            Self {
                volumes,
                fail: false,
            }
        }

        fn empty() -> Self {
            Self::with_volumes(Vec::new())
        }

        fn failing() -> Self {
            Self {
                volumes: Vec::new(),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl CatalogClient for StubCatalog {
        async fn search(&self, _query: &str, _max_results: u32) -> DomainResult<Vec<Volume>> {
            if self.fail {
                return Err(DomainError::Internal("catalog down".to_string()));
            }
            Ok(self.volumes.clone())
        }

        async fn by_subject(
            &self,
            _subject: &str,
            _max_results: u32,
            _start_index: u32,
        ) -> DomainResult<Vec<Volume>> {
            self.search("", 0).await
        }
    }

    fn volume(id: &str, title: &str) -> Volume {
        Volume {
            external_id: id.to_string(),
            title: Some(title.to_string()),
            authors: vec![],
            thumbnail_url: None,
            page_count: None,
            publisher: None,
            published_date: None,
        }
    }

    fn shelf(index: u8) -> ShelfIndex {
        ShelfIndex::new(index).unwrap()
    }

    async fn start_session(catalog: StubCatalog) -> (Arc<MemoryStore>, Session) {
        let store = Arc::new(MemoryStore::new());
        let ctx = AppContext::new(
            store.clone(),
            Arc::new(AnonymousIdentity::new()),
            Arc::new(catalog),
        );
        let mut session = Session::start(ctx).await.expect("session start");
        session.pump_ready().expect("initial snapshot");
        (store, session)
    }

    /// Import enough volumes to bring the tray up to `target` items
    async fn fill_tray_to(session: &mut Session, target: usize) {
        let mut n = 0;
        while session.engine().tray_items().len() < target {
            n += 1;
            let v = volume(&format!("fill-{}", n), &format!("Filler {}", n));
            session.engine_mut().add_volume(&v).await;
            assert_eq!(session.engine_mut().take_notice(), None);
        }
    }

    #[tokio::test]
    async fn empty_collection_is_seeded_with_five_tray_books() {
        let (_store, session) = start_session(StubCatalog::empty()).await;
        let engine = session.engine();
        assert_eq!(engine.items().len(), 5);
        assert_eq!(engine.tray_books().len(), 5);
        assert!(engine.tray_decor().is_empty());
        for s in ShelfIndex::all() {
            assert!(engine.shelf_order(s).is_empty());
        }
        assert!(engine.items().iter().all(|i| i.placement.is_unplaced()));
    }

    #[tokio::test]
    async fn seeding_skips_a_populated_collection() {
        let store = Arc::new(MemoryStore::new());
        let identity = Arc::new(AnonymousIdentity::new());
        let ctx = AppContext::new(store.clone(), identity.clone(), Arc::new(StubCatalog::empty()));
        let _first = Session::start(ctx.clone()).await.unwrap();

        // Same user, same store: a second session must not reseed
        let mut second = Session::start(ctx).await.unwrap();
        second.pump_ready().unwrap();
        assert_eq!(second.engine().items().len(), 5);
    }

    #[tokio::test]
    async fn drag_drop_places_at_the_encoded_fraction() {
        let (_store, mut session) = start_session(StubCatalog::empty()).await;

        let mut drag = DragController::new();
        drag.pick_up("b1");
        let command = drag
            .drop_on(DropTarget::Shelf {
                shelf: shelf(1),
                offset_x: 50.0,
                width: 200.0,
            })
            .unwrap();
        session.engine_mut().apply_drop(command).await;

        let expected = Placement::Placed {
            shelf: shelf(1),
            position: Some(0.25),
        };
        let placed = |s: &Session| {
            s.engine()
                .items()
                .iter()
                .find(|i| i.id == "b1")
                .unwrap()
                .placement
        };
        // Optimistic state is visible immediately
        assert_eq!(placed(&session), expected);

        // And the confirming snapshot preserves it exactly
        session.pump_ready().unwrap();
        assert_eq!(placed(&session), expected);
        let order: Vec<&str> = session
            .engine()
            .shelf_order(shelf(1))
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(order, ["b1"]);
    }

    #[tokio::test]
    async fn full_tray_rejects_imports_with_zero_writes() {
        let (store, mut session) = start_session(StubCatalog::empty()).await;
        fill_tray_to(&mut session, MAX_TRAY_ITEMS).await;

        let writes_before = store.write_count().await;
        let items_before = session.engine().items().len();

        session
            .engine_mut()
            .add_volume(&volume("extra", "One Too Many"))
            .await;

        assert_eq!(session.engine_mut().take_notice(), Some(Notice::TrayFull));
        assert_eq!(session.engine().items().len(), items_before);
        assert_eq!(store.write_count().await, writes_before);
    }

    #[tokio::test]
    async fn full_tray_rejects_decor_and_random_fill() {
        let (store, mut session) = start_session(StubCatalog::empty()).await;
        fill_tray_to(&mut session, MAX_TRAY_ITEMS).await;
        let writes_before = store.write_count().await;

        session.engine_mut().add_decor(DecorKind::Plant, 1).await;
        assert_eq!(session.engine_mut().take_notice(), Some(Notice::TrayFull));

        session.engine_mut().random_fill().await;
        assert_eq!(session.engine_mut().take_notice(), Some(Notice::TrayFull));
        assert_eq!(store.write_count().await, writes_before);
    }

    #[tokio::test]
    async fn decor_variant_clamps_to_the_subtype_maximum() {
        let (store, mut session) = start_session(StubCatalog::empty()).await;
        session.engine_mut().add_decor(DecorKind::Candle, 99).await;
        assert_eq!(session.engine_mut().take_notice(), None);

        let decor = session.engine().tray_decor();
        assert_eq!(decor.len(), 1);
        assert_eq!(
            decor[0].kind,
            ItemKind::Decor {
                kind: DecorKind::Candle,
                variant: 4
            }
        );

        // The clamped variant is what the store holds, not a render fix
        let engine = session.engine();
        let stored = store
            .get(engine.user_id(), &decor[0].id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.kind, decor[0].kind);
    }

    #[tokio::test]
    async fn applying_the_same_snapshot_twice_changes_nothing() {
        let (store, mut session) = start_session(StubCatalog::empty()).await;
        session.engine_mut().move_to_shelf("b2", shelf(0), 0.4).await;

        let engine = session.engine_mut();
        let snapshot = store.list(engine.user_id()).await.unwrap();
        engine.apply_snapshot(snapshot.clone());
        let after_first = engine.items().to_vec();
        engine.apply_snapshot(snapshot);
        assert_eq!(engine.items(), after_first.as_slice());
    }

    #[tokio::test]
    async fn moving_to_tray_clears_shelf_and_position() {
        let (store, mut session) = start_session(StubCatalog::empty()).await;
        session.engine_mut().move_to_shelf("b3", shelf(2), 0.9).await;
        session.engine_mut().move_to_tray("b3").await;

        let b3 = |items: &[crate::domain::Item]| {
            items.iter().find(|i| i.id == "b3").unwrap().placement
        };
        assert_eq!(b3(session.engine().items()), Placement::Unplaced);

        session.pump_ready().unwrap();
        assert_eq!(b3(session.engine().items()), Placement::Unplaced);
        let stored = store
            .get(session.engine().user_id(), "b3")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.placement, Placement::Unplaced);
    }

    #[tokio::test]
    async fn failed_move_keeps_optimistic_state_and_raises_a_notice() {
        let (store, mut session) = start_session(StubCatalog::empty()).await;

        store.fail_next_write().await;
        session.engine_mut().move_to_shelf("b1", shelf(1), 0.5).await;

        // No rollback: the optimistic placement stays visible
        let b1 = session
            .engine()
            .items()
            .iter()
            .find(|i| i.id == "b1")
            .unwrap();
        assert_eq!(
            b1.placement,
            Placement::Placed {
                shelf: shelf(1),
                position: Some(0.5)
            }
        );
        assert_eq!(session.engine_mut().take_notice(), Some(Notice::MoveFailed));

        // The next authoritative snapshot (here triggered by a later
        // successful write) corrects the divergence
        session.engine_mut().move_to_shelf("b2", shelf(2), 0.1).await;
        session.pump_ready().unwrap();
        let b1 = session
            .engine()
            .items()
            .iter()
            .find(|i| i.id == "b1")
            .unwrap();
        assert_eq!(b1.placement, Placement::Unplaced);
    }

    #[tokio::test]
    async fn stale_snapshot_snaps_back_then_self_corrects() {
        // No initial pump: the pre-move snapshot stays queued
        let ctx = AppContext::new(
            Arc::new(MemoryStore::new()),
            Arc::new(AnonymousIdentity::new()),
            Arc::new(StubCatalog::empty()),
        );
        let mut session = Session::start(ctx).await.unwrap();
        session.engine_mut().move_to_shelf("b1", shelf(0), 0.3).await;

        // The pre-move snapshot is still queued: applying it briefly
        // reverts the optimistic placement
        assert!(session.pump_one().await.unwrap());
        let b1_placement = |s: &Session| {
            s.engine()
                .items()
                .iter()
                .find(|i| i.id == "b1")
                .unwrap()
                .placement
        };
        assert_eq!(b1_placement(&session), Placement::Unplaced);

        // The write's own snapshot lands next and wins
        assert!(session.pump_one().await.unwrap());
        assert_eq!(
            b1_placement(&session),
            Placement::Placed {
                shelf: shelf(0),
                position: Some(0.3)
            }
        );
    }

    #[tokio::test]
    async fn delete_removes_locally_and_remotely() {
        let (store, mut session) = start_session(StubCatalog::empty()).await;
        session.engine_mut().delete("b4").await;

        assert!(session.engine().items().iter().all(|i| i.id != "b4"));
        session.pump_ready().unwrap();
        assert_eq!(session.engine().items().len(), 4);
        assert!(store
            .get(session.engine().user_id(), "b4")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn random_fill_imports_a_batch() {
        let volumes: Vec<Volume> = (0..8)
            .map(|n| volume(&format!("r{}", n), &format!("Random {}", n)))
            .collect();
        let (store, mut session) = start_session(StubCatalog::with_volumes(volumes)).await;
        let writes_before = store.write_count().await;

        session.engine_mut().random_fill().await;
        assert_eq!(session.engine_mut().take_notice(), None);
        assert_eq!(session.engine().tray_items().len(), 13);
        assert_eq!(store.write_count().await, writes_before + 8);
    }

    #[tokio::test]
    async fn random_fill_checks_capacity_once_per_batch() {
        let volumes: Vec<Volume> = (0..8)
            .map(|n| volume(&format!("r{}", n), &format!("Random {}", n)))
            .collect();
        let (_store, mut session) = start_session(StubCatalog::with_volumes(volumes)).await;
        fill_tray_to(&mut session, MAX_TRAY_ITEMS - 1).await;

        // One free slot admits the whole batch; the policy is checked
        // before the batch, not per item
        session.engine_mut().random_fill().await;
        assert_eq!(session.engine_mut().take_notice(), None);
        assert_eq!(session.engine().tray_items().len(), MAX_TRAY_ITEMS - 1 + 8);
    }

    #[tokio::test]
    async fn random_fill_with_no_hits_is_informational() {
        let (store, mut session) = start_session(StubCatalog::empty()).await;
        let writes_before = store.write_count().await;
        session.engine_mut().random_fill().await;
        assert_eq!(
            session.engine_mut().take_notice(),
            Some(Notice::EmptyRandomFill)
        );
        assert_eq!(store.write_count().await, writes_before);
    }

    #[tokio::test]
    async fn empty_search_raises_an_informational_notice() {
        let (_store, mut session) = start_session(StubCatalog::empty()).await;
        let hits = session.engine_mut().search("nothing here").await;
        assert!(hits.is_empty());
        assert_eq!(session.engine_mut().take_notice(), Some(Notice::EmptySearch));
    }

    #[tokio::test]
    async fn failed_search_is_a_notice_not_a_fault() {
        let (_store, mut session) = start_session(StubCatalog::failing()).await;
        let hits = session.engine_mut().search("any").await;
        assert!(hits.is_empty());
        assert_eq!(
            session.engine_mut().take_notice(),
            Some(Notice::SearchFailed)
        );
    }

    #[tokio::test]
    async fn blank_search_does_nothing() {
        let (_store, mut session) = start_session(StubCatalog::failing()).await;
        let hits = session.engine_mut().search("   ").await;
        assert!(hits.is_empty());
        assert_eq!(session.engine_mut().take_notice(), None);
    }

    #[tokio::test]
    async fn imported_volume_lands_in_the_tray_with_catalog_data() {
        let (_store, mut session) = start_session(StubCatalog::empty()).await;
        let mut v = volume("vol-1", "The Clockwork Library");
        v.page_count = Some(412);
        v.thumbnail_url = Some("https://img/t1.png".to_string());
        session.engine_mut().add_volume(&v).await;

        let books = session.engine().tray_books();
        let added = books.iter().find(|i| i.title == "The Clockwork Library");
        let added = added.expect("imported book in tray");
        assert!(!added.id.is_empty());
        match &added.kind {
            ItemKind::Book {
                page_count,
                thumbnail_url,
                external_id,
                ..
            } => {
                assert_eq!(*page_count, Some(412));
                assert_eq!(thumbnail_url.as_deref(), Some("https://img/t1.png"));
                assert_eq!(external_id.as_deref(), Some("vol-1"));
            }
            other => panic!("expected a book, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn failed_identity_is_fatal_to_session_start() {
        struct NoIdentity;

        #[async_trait]
        impl crate::repository::IdentityProvider for NoIdentity {
            async fn ensure_user(&self) -> DomainResult<String> {
                Err(DomainError::Internal("auth unavailable".to_string()))
            }
        }

        let ctx = AppContext::new(
            Arc::new(MemoryStore::new()),
            Arc::new(NoIdentity),
            Arc::new(StubCatalog::empty()),
        );
        let err = Session::start(ctx).await.unwrap_err();
        assert!(matches!(err, DomainError::Provisioning(_)));
    }

    #[test]
    fn notices_carry_the_user_facing_messages() {
        assert_eq!(
            Notice::TrayFull.user_message(),
            "Tray is full. Move some items to a shelf or remove them."
        );
        assert_eq!(
            Notice::EmptySearch.user_message(),
            "No books found for that search."
        );
    }
}
