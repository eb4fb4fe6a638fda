// Copyright (C) 2025 The Asyncrawler Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#[cfg(test)]
mod tests {
    use asyncrawler::fetcher::{build_request, decode_body};
    use asyncrawler::transaction::ResponseBody;
    use asyncrawler::Transaction;
    use bytes::Bytes;
    use hyper::header::{HOST, USER_AGENT};
    use hyper::Method;

    #[test]
    fn json_content_type_is_decoded_as_json() {
        let body = decode_body("application/json; charset=utf-8", Bytes::from_static(br#"{"a":1}"#));
        assert!(matches!(body, ResponseBody::Json(_)));
    }

    #[test]
    fn malformed_json_falls_back_to_text() {
        let body = decode_body("application/json", Bytes::from_static(b"not json"));
        assert!(matches!(body, ResponseBody::Text(_)));
    }

    #[test]
    fn text_content_type_is_decoded_as_text() {
        let body = decode_body("text/html", Bytes::from_static(b"<html></html>"));
        assert!(matches!(body, ResponseBody::Text(_)));
    }

    #[test]
    fn unknown_content_type_is_bytes() {
        let body = decode_body("image/png", Bytes::from_static(&[0u8, 1, 2]));
        assert!(matches!(body, ResponseBody::Bytes(_)));
    }

    #[test]
    fn empty_content_type_is_bytes() {
        let body = decode_body("", Bytes::from_static(&[0u8, 1, 2]));
        assert!(matches!(body, ResponseBody::Bytes(_)));
    }

    #[test]
    fn get_request_built_for_no_body() {
        let txn = Transaction::get("http://example.com/a");
        let req = build_request(&txn, None, "ua").unwrap();
        assert_eq!(req.method(), Method::GET);
    }

    #[test]
    fn post_request_built_when_body_present() {
        let txn = Transaction::post("http://example.com/a", b"data".to_vec());
        let req = build_request(&txn, None, "ua").unwrap();
        assert_eq!(req.method(), Method::POST);
    }

    #[test]
    fn existing_user_agent_header_is_not_overwritten() {
        let txn = Transaction::get("http://example.com/a").with_header("User-Agent", "custom");
        let req = build_request(&txn, None, "default-ua").unwrap();
        assert_eq!(req.headers().get(USER_AGENT).unwrap(), "custom");
    }

    #[test]
    fn proxy_rewrites_uri_to_proxy_host() {
        let txn = Transaction::get("http://example.com/page");
        let req = build_request(&txn, Some("http://10.0.0.1:8080"), "ua").unwrap();
        assert_eq!(req.uri().authority().unwrap().as_str(), "10.0.0.1:8080");
        assert_eq!(req.headers().get(HOST).unwrap(), "example.com");
    }
}
