//! IP geolocation lookup module.
//!
//! ipapi.co is asked first; when it fails or reports an error the free
//! ip-api.com endpoint is tried. Both are normalised into [`IpGeoInfo`].

use std::net::Ipv4Addr;
use std::sync::LazyLock;
use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;

use crate::error::{ToolboxError, ToolboxResult};
use crate::types::IpGeoInfo;

const IPAPI_SOURCE: &str = "ipapi.co";
const IP_API_SOURCE: &str = "ip-api.com";
const REQUEST_TIMEOUT_SECS: u64 = 5;

/// Shared HTTP client for geolocation API calls.
static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_default()
});

/// Response structure from ipapi.co.
#[derive(Debug, Deserialize)]
struct IpapiResponse {
    #[serde(default)]
    error: bool,
    reason: Option<String>,
    city: Option<String>,
    region: Option<String>,
    country_name: Option<String>,
    postal: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    org: Option<String>,
    timezone: Option<String>,
    asn: Option<String>,
}

/// Response structure from ip-api.com.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    city: Option<String>,
    region_name: Option<String>,
    country: Option<String>,
    zip: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    isp: Option<String>,
    timezone: Option<String>,
    #[serde(rename = "as")]
    asn: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn from_ipapi(ip: Ipv4Addr, body: &str) -> ToolboxResult<IpGeoInfo> {
    let response: IpapiResponse = serde_json::from_str(body)
        .map_err(|e| ToolboxError::ParseError(format!("Invalid {IPAPI_SOURCE} response: {e}")))?;

    if response.error {
        return Err(ToolboxError::NetworkError(format!(
            "{IPAPI_SOURCE}: {}",
            response.reason.as_deref().unwrap_or("lookup failed")
        )));
    }

    Ok(IpGeoInfo {
        ip: ip.to_string(),
        city: non_empty(response.city),
        region: non_empty(response.region),
        country: non_empty(response.country_name),
        postal: non_empty(response.postal),
        latitude: response.latitude,
        longitude: response.longitude,
        org: non_empty(response.org),
        timezone: non_empty(response.timezone),
        asn: non_empty(response.asn),
        source: IPAPI_SOURCE.to_string(),
    })
}

fn from_ip_api(ip: Ipv4Addr, body: &str) -> ToolboxResult<IpGeoInfo> {
    let response: IpApiResponse = serde_json::from_str(body)
        .map_err(|e| ToolboxError::ParseError(format!("Invalid {IP_API_SOURCE} response: {e}")))?;

    if response.status != "success" {
        let reason = match response.message.as_deref() {
            Some("reserved range" | "private range") => {
                "This IP belongs to a reserved range and cannot be looked up".to_string()
            }
            Some(msg) => msg.to_string(),
            None => "lookup failed".to_string(),
        };
        return Err(ToolboxError::NetworkError(format!("{IP_API_SOURCE}: {reason}")));
    }

    Ok(IpGeoInfo {
        ip: ip.to_string(),
        city: non_empty(response.city),
        region: non_empty(response.region_name),
        country: non_empty(response.country),
        postal: non_empty(response.zip),
        latitude: response.lat,
        longitude: response.lon,
        org: non_empty(response.isp),
        timezone: non_empty(response.timezone),
        asn: non_empty(response.asn),
        source: IP_API_SOURCE.to_string(),
    })
}

async fn fetch(url: &str) -> ToolboxResult<String> {
    let response = HTTP_CLIENT
        .get(url)
        .send()
        .await
        .map_err(|e| ToolboxError::NetworkError(format!("Request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ToolboxError::NetworkError(format!(
            "HTTP {} from {url}",
            status.as_u16()
        )));
    }

    response
        .text()
        .await
        .map_err(|e| ToolboxError::NetworkError(format!("Failed to read response: {e}")))
}

/// Geolocate an IPv4 address.
pub async fn ip_lookup(ip: Ipv4Addr) -> ToolboxResult<IpGeoInfo> {
    debug!("[IP] Looking up {ip} via {IPAPI_SOURCE}");
    let primary = match fetch(&format!("https://ipapi.co/{ip}/json/")).await {
        Ok(body) => from_ipapi(ip, &body),
        Err(e) => Err(e),
    };

    match primary {
        Ok(info) => Ok(info),
        Err(e) => {
            warn!("[IP] {IPAPI_SOURCE} failed for {ip}: {e}; trying {IP_API_SOURCE}");
            let body = fetch(&format!("http://ip-api.com/json/{ip}")).await?;
            from_ip_api(ip, &body)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const IP: Ipv4Addr = Ipv4Addr::new(8, 8, 8, 8);

    #[test]
    fn test_from_ipapi_success() {
        let body = r#"{
            "ip": "8.8.8.8", "city": "Mountain View", "region": "California",
            "country_name": "United States", "postal": "94043",
            "latitude": 37.42, "longitude": -122.08, "org": "GOOGLE",
            "timezone": "America/Los_Angeles", "asn": "AS15169"
        }"#;
        let info = from_ipapi(IP, body).unwrap();
        assert_eq!(info.city.as_deref(), Some("Mountain View"));
        assert_eq!(info.country.as_deref(), Some("United States"));
        assert_eq!(info.asn.as_deref(), Some("AS15169"));
        assert_eq!(info.source, "ipapi.co");
    }

    #[test]
    fn test_from_ipapi_error_flag() {
        let body = r#"{"ip": "10.0.0.1", "error": true, "reason": "Reserved IP Address"}"#;
        let err = from_ipapi(Ipv4Addr::new(10, 0, 0, 1), body).unwrap_err();
        assert!(matches!(err, ToolboxError::NetworkError(msg) if msg.contains("Reserved")));
    }

    #[test]
    fn test_from_ip_api_success() {
        let body = r#"{
            "status": "success", "country": "Nigeria", "regionName": "Lagos",
            "city": "Lagos", "zip": "", "lat": 6.45, "lon": 3.39,
            "timezone": "Africa/Lagos", "isp": "MainOne", "as": "AS37282 MainOne"
        }"#;
        let info = from_ip_api(IP, body).unwrap();
        assert_eq!(info.region.as_deref(), Some("Lagos"));
        assert_eq!(info.org.as_deref(), Some("MainOne"));
        assert!(info.postal.is_none());
        assert_eq!(info.source, "ip-api.com");
    }

    #[test]
    fn test_from_ip_api_reserved_range() {
        let body = r#"{"status": "fail", "message": "private range", "query": "192.168.1.1"}"#;
        let err = from_ip_api(Ipv4Addr::new(192, 168, 1, 1), body).unwrap_err();
        assert!(err.to_string().contains("reserved range"));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(matches!(
            from_ipapi(IP, "<html>rate limited</html>"),
            Err(ToolboxError::ParseError(_))
        ));
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_ip_lookup_real() {
        let info = ip_lookup(IP).await.unwrap();
        assert_eq!(info.ip, "8.8.8.8");
        assert!(info.country.is_some());
    }
}
