// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The collaborator seams implemented on the AWS SDK.

pub mod config_service;
pub mod dynamodb;
pub mod well_architected;

pub use config_service::ConfigServiceSource;
pub use dynamodb::DynamoDbStore;
pub use well_architected::WellArchitectedSource;
