//! Parsing of the `--build NODE:KIND` purchase orders.

use std::str::FromStr;

use thiserror::Error;
use waypoint_defence_core::{NodeId, TurretKind};

/// A turret to buy before the first round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct BuildOrder {
    pub(crate) node: NodeId,
    pub(crate) kind: TurretKind,
}

/// Reasons a purchase order could not be parsed.
#[derive(Debug, PartialEq, Eq, Error)]
pub(crate) enum OrderError {
    #[error("expected NODE:KIND, e.g. 3:cannon")]
    MissingSeparator,
    #[error("`{0}` is not a node index")]
    InvalidNode(String),
    #[error("`{0}` is not a turret kind (standard, cannon, laser, sniper)")]
    UnknownKind(String),
}

impl FromStr for BuildOrder {
    type Err = OrderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (node, kind) = value.split_once(':').ok_or(OrderError::MissingSeparator)?;
        let node = node
            .trim()
            .parse::<u32>()
            .map_err(|_| OrderError::InvalidNode(node.to_owned()))?;
        let kind = kind.trim();
        let kind = TurretKind::ALL
            .into_iter()
            .find(|candidate| format!("{candidate:?}").eq_ignore_ascii_case(kind))
            .ok_or_else(|| OrderError::UnknownKind(kind.to_owned()))?;
        Ok(Self {
            node: NodeId::new(node),
            kind,
        })
    }
}
