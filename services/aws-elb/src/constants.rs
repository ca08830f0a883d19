// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;
use std::time::Duration;

// Query parameters owned by the signer.
pub const AWS_ACCESS_KEY_ID_PARAM: &str = "AWSAccessKeyId";
pub const SIGNATURE_METHOD_PARAM: &str = "SignatureMethod";
pub const SIGNATURE_VERSION_PARAM: &str = "SignatureVersion";
pub const VERSION_PARAM: &str = "Version";
pub const TIMESTAMP_PARAM: &str = "Timestamp";
pub const ACTION_PARAM: &str = "Action";
pub const SIGNATURE_PARAM: &str = "Signature";

/// Parameters that callers may never supply themselves.
pub const RESERVED_PARAMS: [&str; 7] = [
    AWS_ACCESS_KEY_ID_PARAM,
    SIGNATURE_METHOD_PARAM,
    SIGNATURE_VERSION_PARAM,
    VERSION_PARAM,
    TIMESTAMP_PARAM,
    ACTION_PARAM,
    SIGNATURE_PARAM,
];

// Fixed values of the signature version 2 scheme.
pub const SIGNATURE_METHOD: &str = "HmacSHA1";
pub const SIGNATURE_VERSION: &str = "2";
pub const API_VERSION: &str = "2009-05-15";

pub const DEFAULT_ENDPOINT: &str = "elasticloadbalancing.amazonaws.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error code used for locally synthesized transport failures.
pub const TRANSPORT_FAILURE_CODE: &str = "HTTP POST FAILURE";
/// Request id used for locally synthesized transport failures.
pub const TRANSPORT_FAILURE_REQUEST_ID: &str = "N/A";

// Env values used by elbsign.
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const ELB_ENDPOINT: &str = "ELB_ENDPOINT";
pub const ELB_DEBUG: &str = "ELB_DEBUG";

/// AsciiSet for RFC 3986 encoding as used by AWS Query signing.
///
/// - Encode every byte except the unreserved characters: 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', and '~'.
pub static AWS_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
