//! Legacy (v2) payment notifications: delivery, order lookup, and complaint handling.
//!
//! The `app_signature` fields are SHA-1 signatures the merchant computes with its pay sign key;
//! this module forwards them untouched.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	api,
	auth::OpenId,
	client::{Client, Operation},
	http::PlatformHttpClient,
	platform::PlatformDescriptor,
	remote::{Ack, RemoteRequest, TransportErrorMapper},
};

/// `POST pay/delivernotify`: tells the platform an order was shipped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeliverNotify {
	/// Application id.
	pub appid: String,
	/// Buyer.
	pub openid: OpenId,
	/// Platform transaction id.
	pub transid: String,
	/// Merchant order id.
	pub out_trade_no: String,
	/// Unix timestamp of the shipment, as a decimal string.
	pub deliver_timestamp: String,
	/// `"1"` for shipped, `"0"` for failed.
	pub deliver_status: String,
	/// Free-form status message.
	pub deliver_msg: String,
	/// Merchant signature over the fields above.
	pub app_signature: String,
	/// Signature algorithm, normally `sha1`.
	pub sign_method: String,
}
impl Operation for DeliverNotify {
	type Output = Ack;

	fn name(&self) -> &'static str {
		"pay_delivernotify"
	}

	fn request(&self, descriptor: &PlatformDescriptor) -> Result<RemoteRequest> {
		Ok(RemoteRequest::post_json(descriptor.api_url("pay/delivernotify")?, self)?)
	}
}

/// `POST pay/orderquery`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrderQuery {
	/// Application id.
	pub appid: String,
	/// Signed `out_trade_no=...&partner=...&sign=...` package.
	pub package: String,
	/// Unix timestamp, as a decimal string.
	pub timestamp: String,
	/// Merchant signature.
	pub app_signature: String,
	/// Signature algorithm, normally `sha1`.
	pub sign_method: String,
}
impl Operation for OrderQuery {
	type Output = OrderQueryResult;

	fn name(&self) -> &'static str {
		"pay_orderquery"
	}

	fn request(&self, descriptor: &PlatformDescriptor) -> Result<RemoteRequest> {
		Ok(RemoteRequest::post_json(descriptor.api_url("pay/orderquery")?, self)?)
	}
}

/// Response of [`OrderQuery`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct OrderQueryResult {
	/// Order details.
	pub order_info: OrderInfo,
}

/// Order state reported by [`OrderQuery`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct OrderInfo {
	/// Query result code; `0` on success.
	#[serde(default)]
	pub ret_code: i64,
	/// Query result message.
	#[serde(default)]
	pub ret_msg: String,
	/// Payment state; `"0"` means paid.
	#[serde(default)]
	pub trade_state: String,
	/// Platform transaction id.
	#[serde(default)]
	pub transaction_id: String,
	/// Merchant order id.
	#[serde(default)]
	pub out_trade_no: String,
	/// Remaining fields, kept verbatim.
	#[serde(flatten)]
	pub other: Map<String, Value>,
}

/// `GET payfeedback/update`: marks a buyer complaint as resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackUpdate {
	/// Buyer who filed the complaint.
	pub openid: OpenId,
	/// Complaint id.
	pub feedback_id: i64,
}
impl Operation for FeedbackUpdate {
	type Output = Ack;

	fn name(&self) -> &'static str {
		"payfeedback_update"
	}

	fn request(&self, descriptor: &PlatformDescriptor) -> Result<RemoteRequest> {
		Ok(RemoteRequest::get(descriptor.api_url("payfeedback/update")?)
			.with_query("openid", &self.openid)
			.with_query("feedbackid", &self.feedback_id.to_string()))
	}
}

impl<C, M> Client<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Reports a shipment.
	pub async fn pay_deliver_notify(&self, notify: &DeliverNotify) -> Result<()> {
		api::require(!notify.transid.is_empty(), "transid is empty")?;

		self.execute(notify).await.map(|_| ())
	}

	/// Looks up an order.
	pub async fn pay_order_query(&self, query: &OrderQuery) -> Result<OrderInfo> {
		api::require(!query.package.is_empty(), "order query package is empty")?;

		Ok(self.execute(query).await?.order_info)
	}

	/// Marks a complaint as resolved.
	pub async fn pay_feedback_update(&self, openid: OpenId, feedback_id: i64) -> Result<()> {
		self.execute(&FeedbackUpdate { openid, feedback_id }).await.map(|_| ())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn feedback_update_is_a_query_string_call() {
		let openid = OpenId::new("oBuyer").expect("Open identifier fixture should be valid.");
		let request = FeedbackUpdate { openid, feedback_id: 77 }
			.request(&PlatformDescriptor::official())
			.expect("Feedback update should build.");

		assert!(request.body.is_none());
		assert_eq!(
			request.url.as_str(),
			"https://api.weixin.qq.com/payfeedback/update?openid=oBuyer&feedbackid=77"
		);
	}

	#[test]
	fn order_info_keeps_unknown_fields() {
		let result: OrderQueryResult = serde_json::from_str(
			"{\"errcode\":0,\"order_info\":{\"ret_code\":0,\"trade_state\":\"0\",\"total_fee\":\"1\"}}",
		)
		.expect("Order query fixture should decode.");

		assert_eq!(result.order_info.trade_state, "0");
		assert_eq!(result.order_info.other.get("total_fee"), Some(&Value::from("1")));
	}
}
