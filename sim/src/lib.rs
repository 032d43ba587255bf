//! Headless buoyancy simulator: loads a scene, steps it with Rapier and logs
//! how the bodies ride the water.

pub mod init;
pub mod scene;
