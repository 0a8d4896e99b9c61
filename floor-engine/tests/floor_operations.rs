//! 并桌、并单、换桌、联台与布局事件集成测试

mod common;

use common::{menu, seat, session, session_with};
use floor_engine::{
    EventOutcome, FloorError, InteractionMode, NewItem, Rejection, SessionConfig, ViewKind,
};
use shared::{
    ContextAction, DiningTable, ErrorCode, FloorEvent, OrderStatus, TableBinding, TableStatus,
};

fn tap(number: &str) -> FloorEvent {
    FloorEvent::TableTap {
        id: format!("table-{number}"),
        number: number.into(),
    }
}

fn action(action: ContextAction, number: &str) -> FloorEvent {
    FloorEvent::ContextAction {
        action,
        table_number: number.into(),
    }
}

fn table<'a>(tables: &'a [DiningTable], number: &str) -> &'a DiningTable {
    tables.iter().find(|t| t.number == number).unwrap()
}

// ========================================================================
//  并桌开单
// ========================================================================

#[tokio::test]
async fn test_merge_tables_opens_composite_order() {
    let (_backend, mut session) = session(10).await;

    session.handle_event(action(ContextAction::MergeTables, "10")).await.unwrap();
    assert!(matches!(
        session.handle_event(tap("4")).await.unwrap(),
        EventOutcome::SelectionChanged
    ));

    // 选择中显示预览
    let preview = session.view();
    assert!(preview.iter().any(|v| v.kind == ViewKind::Preview && v.number == "4-10"));

    let plan = session.confirm_merge_tables().unwrap();
    assert_eq!(plan.binding.to_string(), "4-10");
    assert_eq!(plan.capacity, 8);
    assert_eq!(session.mode(), &InteractionMode::Normal);
    assert_eq!(session.prompt().map(|p| p.capacity), Some(8));

    session.confirm_client_count(6).unwrap();
    let sent = session.send_order().await.unwrap().unwrap();
    assert_eq!(sent.table_number, TableBinding::merged(["4", "10"]));

    let index = session.occupancy();
    assert!(index.is_occupied("4"));
    assert!(index.is_occupied("10"));
    assert!(index.contains("4-10"));
    assert!(!index.is_occupied("5"));

    // 成员桌都被置为占用；视图多一条合并记录
    assert_eq!(table(session.tables(), "4").status, TableStatus::Occupied);
    assert_eq!(table(session.tables(), "10").status, TableStatus::Occupied);
    let merged = session.view();
    let record = merged.iter().find(|v| v.kind == ViewKind::Merged).unwrap();
    assert_eq!(record.id, "merged-4-10");
    assert_eq!(record.capacity, 8);

    // 点任一成员桌都恢复这张订单
    let outcome = session.tap_table("10").await.unwrap();
    assert!(matches!(outcome, EventOutcome::OrderOpened(ref o) if o.id == sent.id));
}

#[tokio::test]
async fn test_merge_selection_rules() {
    let (_backend, mut session) = session(5).await;
    seat(&mut session, "3", 10.0).await;

    session.begin_merge_tables();
    assert!(matches!(
        session.toggle_merge_table("3"),
        Err(FloorError::Rejected(Rejection::TableOccupied(_)))
    ));
    assert!(session.toggle_merge_table("1").unwrap());
    assert!(matches!(
        session.confirm_merge_tables(),
        Err(FloorError::Rejected(Rejection::TooFewTables(1)))
    ));

    // 再点一次取消选择
    assert!(!session.toggle_merge_table("1").unwrap());

    // 占用的桌不能发起并桌
    session.cancel_mode();
    assert!(session.handle_event(action(ContextAction::MergeTables, "3")).await.is_err());
    assert_eq!(session.mode(), &InteractionMode::Normal);
}

#[tokio::test]
async fn test_merged_outline_follows_layout() {
    let tables = vec![
        DiningTable::new("a", "1", 2).placed(0.0, 0.0, 80.0, 60.0),
        DiningTable::new("b", "2", 2).placed(0.0, 70.0, 100.0, 60.0),
        DiningTable::new("c", "3", 4).placed(200.0, 0.0, 60.0, 60.0),
    ];
    let (_backend, mut session) = session_with(tables, SessionConfig::default()).await;

    // 1 和 2 上下排列 -> 竖向
    session.begin_merge_tables();
    session.toggle_merge_table("1").unwrap();
    session.toggle_merge_table("2").unwrap();
    let column = session.confirm_merge_tables().unwrap();
    assert_eq!((column.geometry.x, column.geometry.y), (0.0, 0.0));
    assert_eq!((column.geometry.width, column.geometry.height), (100.0, 120.0));

    // 1 和 3 左右排列 -> 横向
    session.begin_merge_tables();
    session.toggle_merge_table("3").unwrap();
    session.toggle_merge_table("1").unwrap();
    let row = session.confirm_merge_tables().unwrap();
    assert_eq!(row.binding.to_string(), "1-3");
    assert_eq!((row.geometry.width, row.geometry.height), (140.0, 60.0));
}

// ========================================================================
//  并单
// ========================================================================

#[tokio::test]
async fn test_merge_order_into_another_table() {
    let (backend, mut session) = session(6).await;
    let source = seat(&mut session, "3", 12.0).await;
    let target = seat(&mut session, "5", 20.0).await;

    assert_eq!(
        session.handle_event(action(ContextAction::MergeOrders, "3")).await.unwrap(),
        EventOutcome::ModeChanged
    );
    let outcome = session.handle_event(tap("5")).await.unwrap();
    let EventOutcome::OrdersMerged(merged) = outcome else {
        panic!("expected merged order, got {:?}", outcome);
    };

    assert_eq!(merged.id, target.id);
    assert_eq!(merged.merged_from, vec!["3".to_string()]);
    assert_eq!(merged.subtotal, 32.0);
    let folded = merged.items.iter().find(|i| i.price == 12.0).unwrap();
    assert_eq!(folded.source_table.as_deref(), Some("3"));
    assert_eq!(session.mode(), &InteractionMode::Normal);

    // 源订单从活动列表消失，3 号桌释放
    assert!(session.orders().iter().all(|o| o.id != source.id));
    assert!(backend.all_orders().iter().all(|o| o.id != source.id));
    assert!(!session.occupancy().is_occupied("3"));
    assert_eq!(table(session.tables(), "3").status, TableStatus::Available);

    session.resume_order(&merged.id).await.unwrap();
    let by_table = session.bill_by_table().unwrap();
    assert_eq!(by_table, vec![("3".to_string(), 12.0), ("5".to_string(), 20.0)]);
}

#[tokio::test]
async fn test_merge_orders_rejections() {
    let (backend, mut session) = session(4).await;
    seat(&mut session, "1", 5.0).await;

    assert!(matches!(
        session.merge_orders("1", "1").await,
        Err(FloorError::Rejected(Rejection::MergeSameOrder))
    ));
    assert!(matches!(
        session.merge_orders("1", "2").await,
        Err(FloorError::Rejected(Rejection::TableHasNoOrder(t))) if t == "2"
    ));
    assert!(matches!(
        session.handle_event(action(ContextAction::MergeOrders, "4")).await,
        Err(FloorError::Rejected(Rejection::TableHasNoOrder(_)))
    ));
    assert_eq!(session.mode(), &InteractionMode::Normal);
    assert_eq!(backend.calls("merge_orders"), 0);
}

#[tokio::test]
async fn test_merged_sent_order_cannot_go_back_to_hold() {
    let (backend, mut session) = session(6).await;
    seat(&mut session, "3", 12.0).await;
    let target = seat(&mut session, "5", 20.0).await;

    // 3 号桌重新打开后并入已送厨房的 5 号桌，当前单变成目标单
    let source = session.tap_table("3").await.unwrap();
    assert!(matches!(source, EventOutcome::OrderOpened(_)));
    session.merge_orders("3", "5").await.unwrap();
    assert_eq!(session.current().map(|o| o.id.as_str()), Some(target.id.as_str()));
    assert_eq!(session.current().unwrap().status, OrderStatus::Sent);

    let updates = backend.calls("update_order");
    let err = session.hold_order().await.unwrap_err();
    assert!(matches!(
        err,
        FloorError::Rejected(Rejection::InvalidTransition {
            from: OrderStatus::Sent,
            to: OrderStatus::Hold
        })
    ));
    assert_eq!(err.code(), ErrorCode::InvalidStatusTransition);
    assert_eq!(backend.calls("update_order"), updates);
    assert!(!session.is_sending());

    let stored = backend.all_orders().into_iter().find(|o| o.id == target.id).unwrap();
    assert_eq!(stored.status, OrderStatus::Sent);

    // 仍可再次送厨房
    let sent = session.send_order().await.unwrap().unwrap();
    assert_eq!(sent.status, OrderStatus::Sent);
    assert_eq!(sent.subtotal, 32.0);
}

// ========================================================================
//  换桌
// ========================================================================

#[tokio::test]
async fn test_move_order_to_free_table() {
    let (_backend, mut session) = session(6).await;
    let order = seat(&mut session, "1", 7.0).await;
    seat(&mut session, "2", 7.0).await;

    session.handle_event(action(ContextAction::MoveOrderTable, "1")).await.unwrap();
    assert_eq!(
        session.mode(),
        &InteractionMode::MoveOrder {
            order_id: order.id.clone()
        }
    );

    // 目标桌已占用：拒绝并保持换桌模式
    let err = session.handle_event(tap("2")).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::TableOccupied);
    assert!(matches!(session.mode(), InteractionMode::MoveOrder { .. }));

    let outcome = session.handle_event(tap("6")).await.unwrap();
    let EventOutcome::OrderMoved(moved) = outcome else {
        panic!("expected moved order, got {:?}", outcome);
    };
    assert_eq!(moved.table_number, TableBinding::single("6"));
    assert!(!session.occupancy().is_occupied("1"));
    assert!(session.occupancy().is_occupied("6"));
    assert_eq!(table(session.tables(), "1").status, TableStatus::Available);
    assert_eq!(table(session.tables(), "6").status, TableStatus::Occupied);
}

// ========================================================================
//  联台
// ========================================================================

#[tokio::test]
async fn test_link_and_unlink_tables() {
    let (backend, mut session) = session(8).await;
    for number in ["1", "2", "3", "7"] {
        seat(&mut session, number, 10.0).await;
    }

    let group = session
        .link_tables("1", &["2".to_string(), "3".to_string()])
        .await
        .unwrap();
    assert_eq!(group.leader, "1");
    assert_eq!(group.members, vec!["1", "2", "3"]);
    assert_eq!(
        table(session.tables(), "2").group_id.as_deref(),
        Some(group.group_id.as_str())
    );

    // 2 号桌已在组内，不能再联到 7 号桌
    let err = session.link_tables("7", &["2".to_string()]).await.unwrap_err();
    assert!(matches!(
        err,
        FloorError::Rejected(Rejection::TableAlreadyLinked { ref table, .. }) if table == "2"
    ));

    // 单独解除 2 号桌，其余保持
    let outcome = session.handle_event(action(ContextAction::UnlinkTable, "2")).await.unwrap();
    let EventOutcome::Unlinked(Some(remaining)) = outcome else {
        panic!("expected remaining group, got {:?}", outcome);
    };
    assert_eq!(remaining.members, vec!["1", "3"]);
    assert!(table(session.tables(), "2").group_id.is_none());
    assert!(table(session.tables(), "1").group_id.is_some());
    assert!(table(session.tables(), "3").group_id.is_some());

    assert!(matches!(
        session.unlink_table("2", false).await,
        Err(FloorError::Rejected(Rejection::TableNotLinked(_)))
    ));

    // 全部解除
    assert!(session.unlink_table("1", true).await.unwrap().is_none());
    assert!(session.tables().iter().all(|t| t.group_id.is_none()));
    assert!(backend.links().is_empty());
}

#[tokio::test]
async fn test_link_mode_from_context_menu() {
    let (_backend, mut session) = session(4).await;
    seat(&mut session, "1", 10.0).await;
    seat(&mut session, "2", 10.0).await;

    // 没有订单的桌不能当组长
    assert!(matches!(
        session.handle_event(action(ContextAction::LinkTables, "3")).await,
        Err(FloorError::Rejected(Rejection::LeaderWithoutOrder(_)))
    ));

    session.handle_event(action(ContextAction::LinkTables, "1")).await.unwrap();
    session.handle_event(tap("2")).await.unwrap();
    session.handle_event(tap("4")).await.unwrap();
    session.handle_event(tap("4")).await.unwrap();
    assert_eq!(
        session.mode(),
        &InteractionMode::LinkTables {
            leader: "1".into(),
            members: vec!["2".into()],
        }
    );

    let group = session.confirm_link().await.unwrap();
    assert_eq!(group.members, vec!["1", "2"]);
    assert_eq!(session.mode(), &InteractionMode::Normal);
}

#[tokio::test]
async fn test_pay_linked_group() {
    let (backend, mut session) = session(4).await;
    seat(&mut session, "1", 10.0).await;
    seat(&mut session, "2", 15.0).await;
    session.link_tables("1", &["2".to_string()]).await.unwrap();

    let report = session.pay_linked("2").await.unwrap();
    assert_eq!(report.paid.len(), 2);
    assert!(report.failed.is_empty());

    assert!(session.orders().is_empty());
    assert!(backend.links().is_empty());
    for number in ["1", "2"] {
        let t = table(session.tables(), number);
        assert_eq!(t.status, TableStatus::Available);
        assert!(t.group_id.is_none());
    }
}

#[tokio::test]
async fn test_pay_linked_releases_merged_tables() {
    let (backend, mut session) = session(8).await;
    seat(&mut session, "1", 10.0).await;

    session.begin_merge_tables();
    session.toggle_merge_table("5").unwrap();
    session.toggle_merge_table("6").unwrap();
    session.confirm_merge_tables().unwrap();
    session.confirm_client_count(6).unwrap();
    session.current_order().add_item(NewItem::new(menu("Dish", 30.0), 1));
    session.send_order().await.unwrap().unwrap();
    session.link_tables("1", &["5".to_string()]).await.unwrap();

    let report = session.pay_linked("1").await.unwrap();
    assert_eq!(report.paid.len(), 2);
    assert!(backend.links().is_empty());

    // 5-6 合并单付清后两张桌都释放
    for number in ["1", "5", "6"] {
        assert_eq!(table(session.tables(), number).status, TableStatus::Available);
    }
    assert!(session.orders().is_empty());
    assert!(!session.occupancy().is_occupied("6"));
}

#[tokio::test]
async fn test_pay_linked_reports_partial_failure() {
    let (backend, mut session) = session(4).await;
    seat(&mut session, "1", 10.0).await;
    let declined = seat(&mut session, "2", 15.0).await;
    session.link_tables("1", &["2".to_string()]).await.unwrap();
    backend.decline_payment(declined.id.clone());

    let err = session.pay_linked("1").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::PaymentPartiallyFailed);
    let FloorError::PartialPayment(report) = err else {
        panic!("expected partial payment");
    };
    assert_eq!(report.paid.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert!(report.summary().starts_with("Paid 1 of 2 linked orders"));

    // 未付的订单仍在，组保留
    assert_eq!(session.orders().len(), 1);
    assert_eq!(session.orders()[0].id, declined.id);
    assert_eq!(backend.links().len(), 1);
}

// ========================================================================
//  布局事件
// ========================================================================

#[tokio::test]
async fn test_move_and_rotate_table() {
    let (_backend, mut session) = session(2).await;

    let moved = session
        .handle_event(FloorEvent::TableMove {
            id: "table-2".into(),
            x: 300.0,
            y: 40.0,
        })
        .await
        .unwrap();
    let EventOutcome::TableUpdated(t) = moved else {
        panic!("expected table update");
    };
    assert_eq!((t.geometry.x, t.geometry.y), (300.0, 40.0));

    session
        .handle_event(FloorEvent::TableRotate {
            id: "table-2".into(),
            delta: -90.0,
        })
        .await
        .unwrap();
    assert_eq!(table(session.tables(), "2").geometry.rotation, 270.0);

    let err = session
        .handle_event(FloorEvent::TableRotate {
            id: "missing".into(),
            delta: 15.0,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::TableNotFound);
}
