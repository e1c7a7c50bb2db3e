//! Collaborators the punch core talks to: device location, reverse
//! geocoding, network reachability, the remote punch API and user
//! notifications. Each is a trait with one production implementation.

pub mod api;
pub mod connectivity;
pub mod geocoder;
pub mod location;
pub mod notifier;
