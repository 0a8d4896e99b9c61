//! 测试辅助：内存后端 + 已加载的会话

#![allow(dead_code)]

use std::sync::Arc;

use floor_engine::{FloorSession, MemoryBackend, NewItem, SessionConfig};
use shared::{DiningTable, MenuItemSnapshot, Order};

/// Tables "1".."n", four seats each, in rows of five
pub fn floor(n: u32) -> Vec<DiningTable> {
    (1..=n)
        .map(|i| {
            let col = f64::from((i - 1) % 5);
            let row = f64::from((i - 1) / 5);
            DiningTable::new(format!("table-{i}"), i.to_string(), 4)
                .placed(col * 120.0, row * 120.0, 100.0, 100.0)
        })
        .collect()
}

pub async fn session_with(
    tables: Vec<DiningTable>,
    config: SessionConfig,
) -> (Arc<MemoryBackend>, FloorSession<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::with_tables(tables));
    let mut session = FloorSession::new(backend.clone(), config);
    session.refresh().await.unwrap();
    (backend, session)
}

pub async fn session(tables: u32) -> (Arc<MemoryBackend>, FloorSession<MemoryBackend>) {
    session_with(floor(tables), SessionConfig::default()).await
}

pub fn menu(name: &str, price: f64) -> MenuItemSnapshot {
    MenuItemSnapshot::new(format!("m-{}", name.to_lowercase()), name, price)
}

/// Open a draft on `table` with one client, without persisting it
pub async fn open(session: &mut FloorSession<MemoryBackend>, table: &str) -> Order {
    session.tap_table(table).await.unwrap();
    session.confirm_client_count(1).unwrap()
}

/// Open `table`, add one line, send it to the kitchen
pub async fn seat(session: &mut FloorSession<MemoryBackend>, table: &str, price: f64) -> Order {
    open(session, table).await;
    session
        .current_order()
        .add_item(NewItem::new(menu("Dish", price), 1));
    session.send_order().await.unwrap().unwrap()
}
