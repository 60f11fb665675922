use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PartitionDto {
    #[serde(alias = "partition_id", alias = "mem_id")]
    pub id: i64,
    #[serde(alias = "size")]
    pub capacity: i64,
}
