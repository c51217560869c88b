pub mod broadcast;
pub mod broadcast_statistics;
pub mod msg;
pub mod org;
pub mod unique_contact_count;

pub use broadcast::Entity as BroadcastEntity;
pub use broadcast_statistics::Entity as BroadcastStatisticsEntity;
pub use msg::Entity as MsgEntity;
pub use org::Entity as OrgEntity;
pub use unique_contact_count::Entity as UniqueContactCountEntity;
