//! floor-demo: 前台引擎演示
//!
//! 配置了 FLOOR_SERVER_URL 时连接真实后端并打印桌台视图；
//! 否则使用内存后端跑一遍完整的开单/并单/联台流程。

use std::sync::Arc;

use anyhow::Context;
use floor_client::FloorBackend;
use floor_engine::{
    EngineConfig, FloorSession, MemoryBackend, NewItem, SessionConfig, init_logger_with_file,
};
use shared::{ContextAction, DiningTable, FloorEvent, MenuItemSnapshot};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境变量 (.env 可选)
    dotenv::dotenv().ok();

    // 2. 配置 + 日志
    let config = EngineConfig::from_env();
    init_logger_with_file(&config.log_level, config.log_json, config.log_dir.as_deref())
        .context("failed to initialize logger")?;

    tracing::info!(staff = ?config.staff_id, scoped = config.staff_scoped, "Floor demo starting");

    // 3. 选择后端
    match config.client_config() {
        Some(client_config) => {
            let backend = Arc::new(client_config.build_http_client()?);
            let mut session = FloorSession::new(backend, SessionConfig::from(&config));
            session.refresh().await.context("failed to load floor")?;
            print_floor(&session)?;
        }
        None => {
            let backend = Arc::new(MemoryBackend::with_tables(demo_tables()));
            let mut session = FloorSession::new(backend, SessionConfig::from(&config));
            run_service(&mut session).await?;
        }
    }

    Ok(())
}

fn demo_tables() -> Vec<DiningTable> {
    (1..=8u32)
        .map(|n| {
            let col = f64::from((n - 1) % 4);
            let row = f64::from((n - 1) / 4);
            DiningTable::new(format!("table-{n}"), n.to_string(), 4)
                .placed(col * 120.0, row * 120.0, 100.0, 100.0)
        })
        .collect()
}

/// 一次午市：开单、送厨、并桌、并单、联台结账
async fn run_service(session: &mut FloorSession<MemoryBackend>) -> anyhow::Result<()> {
    session.refresh().await?;

    let burger = MenuItemSnapshot::new("m-burger", "Burger", 12.5);
    let soda = MenuItemSnapshot::new("m-soda", "Soda", 3.0);

    // 1 号桌：两位客人
    let tap = FloorEvent::TableTap {
        id: "table-1".into(),
        number: "1".into(),
    };
    tracing::info!(outcome = ?session.handle_event(tap).await?, "Tapped table 1");
    session.confirm_client_count(2)?;
    session.current_order().add_item(NewItem::new(burger.clone(), 2));
    session.current_order().set_current_client(2);
    session.current_order().add_item(NewItem::new(soda.clone(), 1));
    if let Some(bill) = session.bill_by_client() {
        tracing::info!(?bill, "Bill by client");
    }
    session.send_order().await?;

    // 3 号桌单独开单，之后并入 1 号桌
    session.tap_table("3").await?;
    session.confirm_client_count(1)?;
    session.current_order().add_item(NewItem::new(soda.clone(), 2));
    session.hold_order().await?;

    session
        .handle_event(FloorEvent::ContextAction {
            action: ContextAction::MergeOrders,
            table_number: "3".into(),
        })
        .await?;
    let merged = session
        .handle_event(FloorEvent::TableTap {
            id: "table-1".into(),
            number: "1".into(),
        })
        .await?;
    tracing::info!(outcome = ?merged, "Orders merged");

    // 5 + 6 并桌开单
    session.begin_merge_tables();
    session.toggle_merge_table("5")?;
    session.toggle_merge_table("6")?;
    let plan = session.confirm_merge_tables()?;
    tracing::info!(binding = %plan.binding, capacity = plan.capacity, "Merged tables");
    session.confirm_client_count(6)?;
    session.current_order().add_item(NewItem::new(burger, 6));
    session.send_order().await?;

    print_floor(session)?;

    // 1 号桌和 5-6 联台，一次结账
    let members = vec!["5".to_string()];
    session.link_tables("1", &members).await?;
    match session.pay_linked("1").await {
        Ok(report) => tracing::info!(summary = %report.summary(), "Linked payment"),
        Err(e) => tracing::warn!(error = %e, "Linked payment incomplete"),
    }

    print_floor(session)?;
    Ok(())
}

fn print_floor<B: FloorBackend>(session: &FloorSession<B>) -> anyhow::Result<()> {
    let view = serde_json::to_string_pretty(&session.view())?;
    println!("{view}");
    Ok(())
}
