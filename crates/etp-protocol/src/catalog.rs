//! Protocol Role Catalog.
//!
//! Static, per-wire-version tables describing which protocol/role pairs a
//! session may ask its peer to play. The catalog is the template from which an
//! application builds its list of [`ProtocolRoleRequest`]s before handing them
//! to an extender.
//!
//! Placeholder protocols (not implemented by the dispatch layer) are still
//! listed so that a selection UI can show them, but they are permanently
//! disabled and can never be selected.
//!
//! # Examples
//!
//! ```rust
//! use etp_protocol::{Etp12Protocol, ProtocolCatalog, Role, WireVersion};
//!
//! let catalog = ProtocolCatalog::for_version(WireVersion::V12);
//! let mut requests = catalog.default_role_requests();
//!
//! let transaction = requests
//!     .iter_mut()
//!     .find(|r| r.protocol == Etp12Protocol::Transaction.id())
//!     .unwrap();
//! assert!(!transaction.select(true));
//! assert!(!transaction.selected);
//! ```

use serde::{Deserialize, Serialize};

use crate::protocol::{Etp11Protocol, Etp12Protocol, ProtocolId};
use crate::role::Role;
use crate::version::WireVersion;

/// One immutable row of a catalog table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProtocolDescriptor {
    /// Protocol this row describes
    pub protocol: ProtocolId,
    /// Role the peer is asked to play
    pub default_role: Role,
    /// Whether the row is selected in a freshly built request list
    pub selectable_by_default: bool,
    /// `false` for placeholder protocols that can never be selected
    pub enabled_by_default: bool,
}

impl ProtocolDescriptor {
    /// Build the initial request for this row.
    #[must_use]
    pub const fn role_request(&self) -> ProtocolRoleRequest {
        ProtocolRoleRequest {
            protocol: self.protocol,
            role: self.default_role,
            selected: self.selectable_by_default && self.enabled_by_default,
            enabled: self.enabled_by_default,
        }
    }
}

/// A protocol/role pair an application asks its peer to play.
///
/// `role` names the **peer's** role. A client-side extender registers the
/// complementary local handler; a server-side extender registers `role`
/// literally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProtocolRoleRequest {
    /// Requested protocol
    pub protocol: ProtocolId,
    /// Requested peer role
    pub role: Role,
    /// Whether the pair takes part in negotiation
    pub selected: bool,
    /// Whether the pair is implemented and may be selected
    pub enabled: bool,
}

impl ProtocolRoleRequest {
    /// Change the selection, returning the resulting selection state.
    ///
    /// Disabled entries refuse to become selected; deselecting always works.
    pub fn select(&mut self, selected: bool) -> bool {
        self.selected = selected && self.enabled;
        self.selected
    }
}

// Compact catalog rows: (protocol, peer role, selected, enabled).
type Row<P> = (P, Role, bool, bool);

const ETP11_ROWS: &[Row<Etp11Protocol>] = &[
    (Etp11Protocol::ChannelStreaming, Role::Producer, true, true),
    (Etp11Protocol::ChannelStreaming, Role::Consumer, false, true),
    (Etp11Protocol::ChannelDataFrame, Role::Producer, false, false),
    (Etp11Protocol::ChannelDataFrame, Role::Consumer, false, false),
    (Etp11Protocol::Discovery, Role::Store, true, true),
    (Etp11Protocol::Discovery, Role::Customer, false, true),
    (Etp11Protocol::Store, Role::Store, true, true),
    (Etp11Protocol::Store, Role::Customer, false, true),
    (Etp11Protocol::StoreNotification, Role::Store, true, true),
    (Etp11Protocol::StoreNotification, Role::Customer, false, true),
    (Etp11Protocol::GrowingObject, Role::Store, true, true),
    (Etp11Protocol::GrowingObject, Role::Customer, false, true),
    (Etp11Protocol::DataArray, Role::Store, false, false),
    (Etp11Protocol::DataArray, Role::Customer, false, false),
    (Etp11Protocol::WitsmlSoap, Role::Store, false, false),
];

const ETP12_ROWS: &[Row<Etp12Protocol>] = &[
    (Etp12Protocol::ChannelStreaming, Role::Producer, false, true),
    (Etp12Protocol::ChannelStreaming, Role::Consumer, false, true),
    (Etp12Protocol::ChannelDataFrame, Role::Store, false, false),
    (Etp12Protocol::ChannelDataFrame, Role::Customer, false, false),
    (Etp12Protocol::ChannelSubscribe, Role::Store, true, true),
    (Etp12Protocol::ChannelSubscribe, Role::Customer, false, true),
    (Etp12Protocol::ChannelDataLoad, Role::Store, false, true),
    (Etp12Protocol::ChannelDataLoad, Role::Customer, false, true),
    (Etp12Protocol::Discovery, Role::Store, true, true),
    (Etp12Protocol::Discovery, Role::Customer, false, true),
    (Etp12Protocol::DiscoveryQuery, Role::Store, true, true),
    (Etp12Protocol::DiscoveryQuery, Role::Customer, false, true),
    (Etp12Protocol::Store, Role::Store, true, true),
    (Etp12Protocol::Store, Role::Customer, false, true),
    (Etp12Protocol::StoreQuery, Role::Store, true, true),
    (Etp12Protocol::StoreQuery, Role::Customer, false, true),
    (Etp12Protocol::StoreNotification, Role::Store, true, true),
    (Etp12Protocol::StoreNotification, Role::Customer, false, true),
    (Etp12Protocol::GrowingObject, Role::Store, true, true),
    (Etp12Protocol::GrowingObject, Role::Customer, false, true),
    (Etp12Protocol::GrowingObjectNotification, Role::Store, false, false),
    (Etp12Protocol::GrowingObjectNotification, Role::Customer, false, false),
    (Etp12Protocol::GrowingObjectQuery, Role::Store, true, true),
    (Etp12Protocol::GrowingObjectQuery, Role::Customer, false, true),
    (Etp12Protocol::DataArray, Role::Store, false, false),
    (Etp12Protocol::DataArray, Role::Customer, false, false),
    (Etp12Protocol::Transaction, Role::Store, false, false),
    (Etp12Protocol::Transaction, Role::Customer, false, false),
    (Etp12Protocol::Dataspace, Role::Store, false, false),
    (Etp12Protocol::Dataspace, Role::Customer, false, false),
    (Etp12Protocol::SupportedTypes, Role::Store, false, false),
    (Etp12Protocol::SupportedTypes, Role::Customer, false, false),
];

fn descriptor<P: Into<ProtocolId> + Copy>(row: &Row<P>) -> ProtocolDescriptor {
    let (protocol, default_role, selectable_by_default, enabled_by_default) = *row;
    ProtocolDescriptor {
        protocol: protocol.into(),
        default_role,
        selectable_by_default,
        enabled_by_default,
    }
}

/// Catalog of protocol/role rows for one wire version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolCatalog {
    version: WireVersion,
}

impl ProtocolCatalog {
    /// Catalog for `version`.
    #[must_use]
    pub const fn for_version(version: WireVersion) -> Self {
        Self { version }
    }

    /// Wire version of this catalog.
    #[must_use]
    pub const fn version(&self) -> WireVersion {
        self.version
    }

    /// Lazily iterate the catalog rows in table order.
    pub fn descriptors(&self) -> Box<dyn Iterator<Item = ProtocolDescriptor>> {
        match self.version {
            WireVersion::V11 => Box::new(ETP11_ROWS.iter().map(descriptor)),
            WireVersion::V12 => Box::new(ETP12_ROWS.iter().map(descriptor)),
        }
    }

    /// A fresh request list carrying the default selection.
    #[must_use]
    pub fn default_role_requests(&self) -> Vec<ProtocolRoleRequest> {
        self.descriptors().map(|d| d.role_request()).collect()
    }

    /// Find the row for a protocol/peer-role pair.
    #[must_use]
    pub fn descriptor(&self, protocol: ProtocolId, role: Role) -> Option<ProtocolDescriptor> {
        if protocol.version() != self.version {
            return None;
        }
        self.descriptors()
            .find(|d| d.protocol == protocol && d.default_role == role)
    }

    /// Name of a raw protocol number in this version.
    #[must_use]
    pub fn protocol_name(&self, id: i32) -> &'static str {
        ProtocolId::new(self.version, id).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_disabled_rows_are_listed_but_never_selected() {
        for version in [WireVersion::V11, WireVersion::V12] {
            let requests = ProtocolCatalog::for_version(version).default_role_requests();
            assert!(requests.iter().any(|r| !r.enabled));
            assert!(requests.iter().all(|r| r.enabled || !r.selected));
        }
    }

    #[test]
    fn test_select_refuses_disabled_entry() {
        let catalog = ProtocolCatalog::for_version(WireVersion::V11);
        let mut data_array = catalog
            .descriptor(Etp11Protocol::DataArray.id(), Role::Store)
            .unwrap()
            .role_request();
        assert!(!data_array.select(true));

        let mut customer = catalog
            .descriptor(Etp11Protocol::Discovery.id(), Role::Customer)
            .unwrap()
            .role_request();
        assert!(!customer.selected);
        assert!(customer.select(true));
        assert!(!customer.select(false));
    }

    #[test]
    fn test_descriptor_lookup_is_version_scoped() {
        let catalog = ProtocolCatalog::for_version(WireVersion::V11);
        assert_eq!(
            catalog.descriptor(Etp12Protocol::Discovery.id(), Role::Store),
            None
        );
        assert_eq!(catalog.protocol_name(6), "GrowingObject");
        assert_eq!(
            ProtocolCatalog::for_version(WireVersion::V12).protocol_name(22),
            "ChannelDataLoad"
        );
    }

    #[test]
    fn test_v11_discovery_defaults() {
        let selected: Vec<_> = ProtocolCatalog::for_version(WireVersion::V11)
            .default_role_requests()
            .into_iter()
            .filter(|r| r.protocol == Etp11Protocol::Discovery.id())
            .map(|r| (r.role, r.selected))
            .collect();
        assert_eq!(selected, vec![(Role::Store, true), (Role::Customer, false)]);
    }
}
