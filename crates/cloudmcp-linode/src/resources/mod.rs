//! Typed resource models and their endpoints.

pub mod account;
pub mod databases;
pub mod images;
pub mod instances;
pub mod networking;
pub mod nodebalancers;
pub mod volumes;

pub use account::{AccountInfo, Profile};
pub use databases::{
    CreateDatabaseRequest, Database, DatabaseCredentials, DatabaseEngine, DatabaseHosts,
    UpdateDatabaseRequest,
};
pub use images::{
    CreateImageRequest, Image, ImageRegion, ReplicateImageRequest, UpdateImageRequest,
    UploadImageRequest, UploadImageResponse,
};
pub use instances::{CreateInstanceRequest, Instance, InstanceSpecs};
pub use networking::IpAddress;
pub use nodebalancers::{
    CreateNodeBalancerRequest, NodeBalancer, NodeBalancerConfig, NodeBalancerConfigRequest,
    NodesStatus, Transfer, UpdateNodeBalancerRequest,
};
pub use volumes::{AttachVolumeRequest, CreateVolumeRequest, Volume};
