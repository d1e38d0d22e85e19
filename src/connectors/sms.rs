//! SMS and OTP calls routed through the messaging services.

use crate::connectors::client::{expect_status, InterServiceClient};
use crate::connectors::errors::ConnectorError;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// ISC endpoint to verify an OTP
pub const VERIFY_OTP_ENDPOINT: &str = "internal/verify_otp/";
/// ISC endpoint to send an OTP
pub const SEND_OTP_ENDPOINT: &str = "internal/send_otp/";

const KENYA_PREFIX: &str = "+254";
const KENYA_NATIONAL_DIGITS: usize = 9;

lazy_static! {
    static ref KENYAN_MSISDN: Regex = Regex::new(
        r"^(?:254|\+254|0)?((7|1)(?:(?:[129][0-9])|(?:0[0-8])|(4[0-1]))[0-9]{6})$"
    )
    .expect("valid Kenyan MSISDN pattern");
    static ref INTERNATIONAL_MSISDN: Regex = Regex::new(
        r"^(?:(?:\(?(?:00|\+)([1-4]\d\d|[1-9]\d?)\)?)?[-. \\/]?)?((?:\(?\d{1,}\)?[-. \\/]?){0,})(?:[-. \\/]?(?:#|ext\.?|extension|x)[-. \\/]?(\d+))?$"
    )
    .expect("valid international MSISDN pattern");
}

/// An SMS-capable service and the endpoint that sends messages
#[derive(Debug, Clone)]
pub struct SmsIsc {
    pub isc: InterServiceClient,
    pub endpoint: String,
}

impl SmsIsc {
    pub fn new(isc: InterServiceClient, endpoint: impl Into<String>) -> Self {
        Self {
            isc,
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Serialize)]
struct SmsPayload<'a> {
    to: &'a [String],
    message: &'a str,
}

pub fn is_kenyan_number(phone_number: &str) -> bool {
    phone_number.starts_with(KENYA_PREFIX)
}

pub fn is_msisdn_valid(msisdn: &str) -> bool {
    if msisdn.len() < 10 {
        return false;
    }
    KENYAN_MSISDN.is_match(msisdn) || INTERNATIONAL_MSISDN.is_match(msisdn)
}

/// E.164-style form of `msisdn`: Kenyan numbers become `+2547…`, anything
/// else valid keeps its digits behind a single `+`.
pub fn normalize_msisdn(msisdn: &str) -> Result<String, ConnectorError> {
    let compact: String = msisdn
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if !is_msisdn_valid(&compact) {
        return Err(ConnectorError::InvalidInput(format!(
            "invalid phone format: {msisdn}"
        )));
    }

    if let Some(local) = KENYAN_MSISDN
        .captures(&compact)
        .and_then(|captures| captures.get(1))
    {
        return Ok(format!("{}{}", KENYA_PREFIX, local.as_str()));
    }

    let digits: String = compact.chars().filter(char::is_ascii_digit).collect();
    if let Some(international) = digits.strip_prefix("00") {
        return Ok(format!("+{}", international));
    }
    if compact.starts_with('+') {
        return Ok(format!("+{}", digits));
    }

    // Without a country code the number is read as Kenyan; a trunk `0`
    // must then be followed by exactly nine digits
    match digits.strip_prefix('0') {
        Some(national) if national.len() == KENYA_NATIONAL_DIGITS => {
            Ok(format!("{}{}", KENYA_PREFIX, national))
        }
        Some(_) => Err(ConnectorError::InvalidInput(format!(
            "invalid phone format: {msisdn}"
        ))),
        None => Ok(format!("+{}", digits)),
    }
}

/// Send `message` to every number: Kenyan numbers through `sms_client`,
/// the rest through `twilio_client`.
#[tracing::instrument(name = "send sms", skip_all, fields(recipients = phone_numbers.len()))]
pub async fn send_sms(
    phone_numbers: &[String],
    message: &str,
    sms_client: &SmsIsc,
    twilio_client: &SmsIsc,
) -> Result<(), ConnectorError> {
    if message.is_empty() {
        return Err(ConnectorError::InvalidInput(
            "sms not sent: `message` needs to be supplied".to_string(),
        ));
    }

    let (local, foreign): (Vec<String>, Vec<String>) = phone_numbers
        .iter()
        .cloned()
        .partition(|phone| is_kenyan_number(phone));

    if local.is_empty() && foreign.is_empty() {
        return Err(ConnectorError::InvalidInput(
            "sms not sent: `phone numbers` need to be supplied".to_string(),
        ));
    }

    if !foreign.is_empty() {
        deliver(&foreign, message, twilio_client).await?;
    }
    if !local.is_empty() {
        deliver(&local, message, sms_client).await?;
    }

    Ok(())
}

async fn deliver(
    phone_numbers: &[String],
    message: &str,
    client: &SmsIsc,
) -> Result<(), ConnectorError> {
    let payload = SmsPayload {
        to: phone_numbers,
        message,
    };

    let resp = client.isc.post(&client.endpoint, &payload).await?;
    tracing::debug!(status = %resp.status(), service = client.isc.identity().name(), "sms response");

    expect_status(resp, StatusCode::OK, "sms not sent: unable to send SMS").await?;
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyOtpPayload<'a> {
    msisdn: &'a str,
    verification_code: &'a str,
}

#[derive(Deserialize)]
struct OtpVerification {
    #[serde(rename = "IsVerified")]
    is_verified: bool,
}

/// Confirm a phone number by checking the code that was sent to it
#[tracing::instrument(name = "verify otp", skip(otp, otp_client))]
pub async fn verify_otp(
    msisdn: &str,
    otp: &str,
    otp_client: &InterServiceClient,
) -> Result<bool, ConnectorError> {
    let normalized = normalize_msisdn(msisdn)?;
    let payload = VerifyOtpPayload {
        msisdn: &normalized,
        verification_code: otp,
    };

    let resp = otp_client.post(VERIFY_OTP_ENDPOINT, &payload).await?;
    let body = expect_status(resp, StatusCode::OK, "unable to verify OTP").await?;

    let verification: OtpVerification = serde_json::from_str(&body).map_err(|err| {
        ConnectorError::InvalidResponse(format!(
            "can't unmarshal OTP response data from JSON: {err}"
        ))
    })?;

    Ok(verification.is_verified)
}

/// Ask the OTP service to send a code to `msisdn` and return that code
#[tracing::instrument(name = "send otp", skip(otp_client))]
pub async fn send_otp(msisdn: &str, otp_client: &InterServiceClient) -> Result<String, ConnectorError> {
    let payload = serde_json::json!({ "msisdn": msisdn });

    let resp = otp_client.post(SEND_OTP_ENDPOINT, &payload).await?;
    let body = expect_status(resp, StatusCode::OK, "unable to generate otp").await?;

    serde_json::from_str::<String>(&body).map_err(|err| {
        ConnectorError::InvalidResponse(format!("unable to decode send OTP response: {err}"))
    })
}
