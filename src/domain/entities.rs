//! Typed DCIM records as the query layer hands them over.
//!
//! Related objects are embedded as small summaries so that accessors like
//! `rack.site.slug` resolve without further lookups. Aggregate annotations
//! (`count_racks`, `device_count`, ...) are optional and only present when the
//! query asked for them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRef {
    pub pk: u64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    pub pk: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub pk: u64,
    pub name: String,
    pub slug: String,
    pub facility: Option<String>,
    pub asn: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_racks: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_devices: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_prefixes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_vlans: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_circuits: Option<u32>,
}

impl Site {
    pub fn summary(&self) -> SiteRef {
        SiteRef {
            pk: self.pk,
            name: self.name.clone(),
            slug: self.slug.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RackRef {
    pub pk: u64,
    pub name: String,
    pub site: SiteRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rack {
    pub pk: u64,
    pub name: String,
    pub site: SiteRef,
    pub group: Option<NamedRef>,
    pub facility_id: Option<String>,
    pub u_height: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_count: Option<u32>,
}

impl Rack {
    pub fn summary(&self) -> RackRef {
        RackRef {
            pk: self.pk,
            name: self.name.clone(),
            site: self.site.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceTypeRef {
    pub pk: u64,
    pub manufacturer: NamedRef,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpAddressRef {
    pub pk: u64,
    /// CIDR notation, e.g. `10.1.0.5/24`.
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub name: String,
    pub bootstrap_class: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub pk: u64,
    pub name: Option<String>,
    pub device_type: DeviceTypeRef,
    pub device_role: NamedRef,
    pub rack: Option<RackRef>,
    pub position: Option<u16>,
    pub status: Option<Status>,
    pub primary_ip: Option<IpAddressRef>,
}

impl Device {
    pub fn summary(&self) -> DeviceRef {
        DeviceRef {
            pk: self.pk,
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRef {
    pub pk: u64,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortRef {
    pub pk: u64,
    pub name: String,
    pub device: DeviceRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolePort {
    pub pk: u64,
    pub name: String,
    pub device: DeviceRef,
    pub cs_port: Option<PortRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerPort {
    pub pk: u64,
    pub name: String,
    pub device: DeviceRef,
    pub power_outlet: Option<PortRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceConnection {
    pub pk: u64,
    pub interface_a: PortRef,
    pub interface_b: PortRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixRef {
    pub pk: u64,
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vlan {
    pub pk: u64,
    pub vid: u16,
    pub name: String,
    pub site: Option<SiteRef>,
    pub status: Option<Status>,
    pub prefix_set: Vec<PrefixRef>,
}
