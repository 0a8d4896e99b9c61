//! Floor Engine - 餐桌/订单绑定与一致性引擎
//!
//! # 架构概述
//!
//! 运行在单个收银终端上，负责：
//!
//! - **订单生命周期** (`order`, `session`): 本地草稿 -> 挂单/送厨/结账
//! - **占用判定** (`occupancy`): 哪些桌号已被活动订单占用
//! - **并桌/并单** (`merge`): 合并桌台开单、把一张订单并入另一张
//! - **联台** (`link`): 多张各自有单的桌台组成一组，一次结账
//! - **金额** (`money`): Decimal 计算小计/折扣/税/总额
//! - **视图投影** (`view`): 给桌台图渲染器的表格数据
//!
//! 后端通过 `floor_client::FloorBackend` 访问；`memory` 提供进程内实现，
//! 用于测试和离线演示。
//!
//! # 模块结构
//!
//! ```text
//! floor-engine/src/
//! ├── config.rs      # 环境变量配置
//! ├── error.rs       # Rejection / FloorError
//! ├── logger.rs      # tracing 初始化
//! ├── money.rs       # 金额计算
//! ├── order/         # 订单聚合 + 当前订单槽
//! ├── occupancy.rs   # 占用索引
//! ├── merge.rs       # 并桌 / 并单
//! ├── link.rs        # 联台
//! ├── session.rs     # 终端会话 (控制器)
//! ├── view.rs        # 渲染投影
//! └── memory.rs      # 内存后端
//! ```

pub mod config;
pub mod error;
pub mod link;
pub mod logger;
pub mod memory;
pub mod merge;
pub mod money;
pub mod occupancy;
pub mod order;
pub mod session;
pub mod view;

// Re-export 公共类型
pub use config::EngineConfig;
pub use error::{FloorError, FloorResult, Rejection};
pub use link::LinkedPaymentReport;
pub use memory::MemoryBackend;
pub use merge::{MergePlan, MergeSelection};
pub use occupancy::{OccupancyIndex, OccupancyScope};
pub use order::{NewItem, OrderSlot};
pub use session::{ClientCountPrompt, EventOutcome, FloorSession, InteractionMode, SessionConfig};
pub use view::{TableView, ViewKind};

// Re-export logger functions
pub use logger::{init_logger, init_logger_with_file};
