//! Core shared types for the analysis pipeline
//!
//! - `packet`: decoded packet descriptors handed in by the packet source
//! - `flow`: flow identity and summary records

pub mod flow;
pub mod packet;

pub use flow::{FlowAccumulator, FlowKey, FlowRecord};
pub use packet::{PacketDescriptor, TransportProtocol};
