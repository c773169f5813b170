// std
use std::time::Duration as StdDuration;
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use wechat_mp::{
	_preludet::*,
	api::{MassContent, MassDelete, NewGroup, OrderQuery},
	auth::OpenId,
	client::{CallOptions, ReqwestPlatformClient},
	error::{ConfigError, RemoteError, TransportError},
	token::ReqwestAccessTokenSource,
};

const APP_ID: &str = "wx-api-app";
const APP_SECRET: &str = "api-secret";
const ACCESS_TOKEN: &str = "api-access";

async fn setup(server: &MockServer) -> (ReqwestPlatformClient, Arc<ReqwestAccessTokenSource>) {
	server
		.mock_async(|when, then| {
			when.method(GET).path("/cgi-bin/token").query_param("appid", APP_ID);
			then.status(200)
				.header("content-type", "application/json")
				.body(format!("{{\"access_token\":\"{ACCESS_TOKEN}\",\"expires_in\":7200}}"));
		})
		.await;

	build_reqwest_test_client(test_descriptor(&server.url("/")), APP_ID, APP_SECRET)
}

fn open_id(value: &str) -> OpenId {
	OpenId::new(value).expect("Open identifier fixture should be valid.")
}

#[tokio::test]
async fn mass_send_posts_the_tagged_payload() {
	let server = MockServer::start_async().await;
	let (client, source) = setup(&server).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/cgi-bin/message/mass/send")
				.query_param("access_token", ACCESS_TOKEN)
				.json_body(json!({
					"touser": ["oA", "oB"],
					"msgtype": "text",
					"text": { "content": "hello" }
				}));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"errcode\":0,\"errmsg\":\"send job submission success\",\"msg_id\":34182}");
		})
		.await;
	let msg_id = client
		.mass_send_by_open_id(
			vec![open_id("oA"), open_id("oB")],
			MassContent::Text { content: "hello".into() },
		)
		.await
		.expect("Mass send should succeed.");

	assert_eq!(msg_id, 34182);
	assert_eq!(source.metrics().attempts(), 1);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn invalid_input_never_reaches_the_network() {
	let server = MockServer::start_async().await;
	let (client, source) = setup(&server).await;
	let err = client
		.mass_send_by_open_id(Vec::new(), MassContent::Text { content: "hello".into() })
		.await
		.expect_err("Empty recipient lists must be rejected.");

	assert!(matches!(err, Error::Config(ConfigError::InvalidInput { .. })));
	assert_eq!(source.metrics().attempts(), 0);
}

#[tokio::test]
async fn merchant_group_round_trip() {
	let server = MockServer::start_async().await;
	let (client, _source) = setup(&server).await;
	let add = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/merchant/group/add")
				.query_param("access_token", ACCESS_TOKEN)
				.json_body(json!({
					"group_detail": { "group_name": "Summer", "product_list": ["p1", "p2"] }
				}));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"errcode\":0,\"errmsg\":\"success\",\"group_id\":19}");
		})
		.await;
	let rename = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/merchant/group/propertymod")
				.json_body(json!({ "group_id": 19, "group_name": "Autumn" }));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"errcode\":0,\"errmsg\":\"success\"}");
		})
		.await;
	let group_id = client
		.merchant_group_add(NewGroup {
			group_name: "Summer".into(),
			product_list: vec!["p1".into(), "p2".into()],
		})
		.await
		.expect("Group creation should succeed.");

	client.merchant_group_rename(group_id, "Autumn").await.expect("Rename should succeed.");

	add.assert_calls_async(1).await;
	rename.assert_calls_async(1).await;
}

#[tokio::test]
async fn category_properties_decode_nested_values() {
	let server = MockServer::start_async().await;
	let (client, _source) = setup(&server).await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/merchant/category/getproperty")
				.json_body(json!({ "cate_id": 537074298 }));
			then.status(200).header("content-type", "application/json").body(
				"{\"errcode\":0,\"errmsg\":\"success\",\"properties\":[{\"id\":\"1075741879\",\"name\":\"Brand\",\"property_value\":[{\"id\":\"200050867\",\"name\":\"Acme\"}]}]}",
			);
		})
		.await;
	let properties = client
		.merchant_category_properties(537074298)
		.await
		.expect("Property lookup should succeed.");

	assert_eq!(properties.len(), 1);
	assert_eq!(properties[0].name, "Brand");
	assert_eq!(properties[0].values[0].name, "Acme");
}

#[tokio::test]
async fn pay_calls_forward_signed_payloads() {
	let server = MockServer::start_async().await;
	let (client, _source) = setup(&server).await;
	let query = server
		.mock_async(|when, then| {
			when.method(POST).path("/pay/orderquery").json_body(json!({
				"appid": APP_ID,
				"package": "out_trade_no=11&partner=1900000109&sign=ABC",
				"timestamp": "1369745073",
				"app_signature": "53cca9d47b883bd4a5c85e9f6e0f7e9d8c3e9f1d",
				"sign_method": "sha1"
			}));
			then.status(200).header("content-type", "application/json").body(
				"{\"errcode\":0,\"errmsg\":\"ok\",\"order_info\":{\"ret_code\":0,\"ret_msg\":\"\",\"trade_state\":\"0\",\"transaction_id\":\"1900000109\",\"out_trade_no\":\"11\",\"total_fee\":\"1\"}}",
			);
		})
		.await;
	let feedback = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/payfeedback/update")
				.query_param("access_token", ACCESS_TOKEN)
				.query_param("openid", "oBuyer")
				.query_param("feedbackid", "53126");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"errcode\":0,\"errmsg\":\"ok\"}");
		})
		.await;
	let info = client
		.pay_order_query(&OrderQuery {
			appid: APP_ID.into(),
			package: "out_trade_no=11&partner=1900000109&sign=ABC".into(),
			timestamp: "1369745073".into(),
			app_signature: "53cca9d47b883bd4a5c85e9f6e0f7e9d8c3e9f1d".into(),
			sign_method: "sha1".into(),
		})
		.await
		.expect("Order query should succeed.");

	assert_eq!(info.trade_state, "0");
	assert_eq!(info.out_trade_no, "11");
	assert_eq!(info.other.get("total_fee"), Some(&json!("1")));

	client
		.pay_feedback_update(open_id("oBuyer"), 53126)
		.await
		.expect("Feedback update should succeed.");

	query.assert_calls_async(1).await;
	feedback.assert_calls_async(1).await;
}

#[tokio::test]
async fn persistent_rejection_is_retried_exactly_once() {
	let server = MockServer::start_async().await;
	let (client, source) = setup(&server).await;
	let delete = server
		.mock_async(|when, then| {
			when.method(POST).path("/cgi-bin/message/mass/delete");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"errcode\":40001,\"errmsg\":\"invalid credential\"}");
		})
		.await;
	let err = client.mass_delete(30124).await.expect_err("Persistent rejection should surface.");

	assert!(matches!(err, Error::Remote(RemoteError { code: 40001, .. })));
	assert_eq!(source.metrics().attempts(), 2);

	delete.assert_calls_async(2).await;
}

#[tokio::test]
async fn per_call_timeout_surfaces_as_transport_timeout() {
	let server = MockServer::start_async().await;
	let (client, source) = setup(&server).await;
	let slow = server
		.mock_async(|when, then| {
			when.method(POST).path("/cgi-bin/message/mass/delete");
			then.status(200)
				.header("content-type", "application/json")
				.delay(StdDuration::from_millis(1_500))
				.body("{\"errcode\":0,\"errmsg\":\"ok\"}");
		})
		.await;
	let err = client
		.execute_with(
			&MassDelete { msg_id: 30124 },
			&CallOptions::default().with_timeout(StdDuration::from_millis(100)),
		)
		.await
		.expect_err("A slow endpoint should exceed the per-call budget.");

	assert!(matches!(err, Error::Transport(TransportError::Timeout { .. })), "{err:?}");
	assert_eq!(source.metrics().attempts(), 1);

	slow.assert_calls_async(1).await;
}

#[tokio::test]
async fn client_timeout_applies_when_no_override_is_given() {
	let server = MockServer::start_async().await;
	let (client, _source) = setup(&server).await;
	let client = client.with_timeout(StdDuration::from_millis(100));
	let slow = server
		.mock_async(|when, then| {
			when.method(POST).path("/cgi-bin/message/mass/delete");
			then.status(200)
				.header("content-type", "application/json")
				.delay(StdDuration::from_millis(1_500))
				.body("{\"errcode\":0,\"errmsg\":\"ok\"}");
		})
		.await;
	let err = client.mass_delete(30124).await.expect_err("The client budget should apply.");

	assert!(matches!(err, Error::Transport(TransportError::Timeout { .. })), "{err:?}");

	slow.assert_calls_async(1).await;
}
