//! Mass messaging to explicit open-id lists.

// crates.io
use serde::{Serializer, ser::SerializeMap};
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

/// Maximum number of recipients accepted by one send-by-open-id call.
pub const MASS_MAX_RECIPIENTS: usize = 10_000;

/// Body of a mass message; serialized as `msgtype` plus a same-named object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MassContent {
	/// Plain text.
	Text {
		/// Message text; may contain newlines.
		content: String,
	},
	/// Previously uploaded image.
	Image {
		/// Media identifier.
		media_id: String,
	},
	/// Previously uploaded voice clip.
	Voice {
		/// Media identifier.
		media_id: String,
	},
	/// Previously uploaded video.
	Video {
		/// Media identifier.
		media_id: String,
		/// Optional title.
		title: Option<String>,
		/// Optional description.
		description: Option<String>,
	},
	/// Previously uploaded article bundle.
	News {
		/// Media identifier.
		media_id: String,
	},
}
impl MassContent {
	/// The `msgtype` discriminator.
	pub fn msg_type(&self) -> &'static str {
		match self {
			Self::Text { .. } => "text",
			Self::Image { .. } => "image",
			Self::Voice { .. } => "voice",
			Self::Video { .. } => "mpvideo",
			Self::News { .. } => "mpnews",
		}
	}

	fn check(&self) -> Result<(), crate::error::ConfigError> {
		match self {
			Self::Text { content } => api::require(!content.is_empty(), "mass text content is empty"),
			Self::Image { media_id }
			| Self::Voice { media_id }
			| Self::Video { media_id, .. }
			| Self::News { media_id } => api::require(!media_id.is_empty(), "mass media_id is empty"),
		}
	}
}
impl Serialize for MassContent {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		#[derive(Serialize)]
		struct Media<'a> {
			media_id: &'a str,
		}
		#[derive(Serialize)]
		struct Video<'a> {
			media_id: &'a str,
			#[serde(skip_serializing_if = "Option::is_none")]
			title: Option<&'a str>,
			#[serde(skip_serializing_if = "Option::is_none")]
			description: Option<&'a str>,
		}
		#[derive(Serialize)]
		struct Text<'a> {
			content: &'a str,
		}

		let mut map = serializer.serialize_map(Some(2))?;

		map.serialize_entry("msgtype", self.msg_type())?;

		match self {
			Self::Text { content } => map.serialize_entry("text", &Text { content })?,
			Self::Image { media_id } => map.serialize_entry("image", &Media { media_id })?,
			Self::Voice { media_id } => map.serialize_entry("voice", &Media { media_id })?,
			Self::Video { media_id, title, description } => map.serialize_entry(
				"mpvideo",
				&Video { media_id, title: title.as_deref(), description: description.as_deref() },
			)?,
			Self::News { media_id } => map.serialize_entry("mpnews", &Media { media_id })?,
		}

		map.end()
	}
}

/// `POST cgi-bin/message/mass/send`: sends one message to up to 10 000 followers.
#[derive(Clone, Debug, Serialize)]
pub struct MassSendByOpenId {
	/// Recipients.
	#[serde(rename = "touser")]
	pub to_users: Vec<OpenId>,
	/// Message body.
	#[serde(flatten)]
	pub content: MassContent,
}
impl MassSendByOpenId {
	/// Validates the recipient list and content locally.
	pub fn new(to_users: Vec<OpenId>, content: MassContent) -> Result<Self> {
		api::require(!to_users.is_empty(), "mass send needs at least one recipient")?;
		api::require(
			to_users.len() <= MASS_MAX_RECIPIENTS,
			"mass send accepts at most 10000 recipients",
		)?;
		content.check()?;

		Ok(Self { to_users, content })
	}
}
impl Operation for MassSendByOpenId {
	type Output = MassSendReceipt;

	fn name(&self) -> &'static str {
		"message_mass_send"
	}

	fn request(&self, descriptor: &PlatformDescriptor) -> Result<RemoteRequest> {
		Ok(RemoteRequest::post_json(descriptor.api_url("cgi-bin/message/mass/send")?, self)?)
	}
}

/// Response of [`MassSendByOpenId`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct MassSendReceipt {
	/// Identifier of the mass job, used by [`MassDelete`].
	pub msg_id: i64,
}

/// `POST cgi-bin/message/mass/delete`: withdraws a sent article or video mass message.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct MassDelete {
	/// Job identifier returned by the send call.
	#[serde(rename = "msgid")]
	pub msg_id: i64,
}
impl Operation for MassDelete {
	type Output = Ack;

	fn name(&self) -> &'static str {
		"message_mass_delete"
	}

	fn request(&self, descriptor: &PlatformDescriptor) -> Result<RemoteRequest> {
		Ok(RemoteRequest::post_json(descriptor.api_url("cgi-bin/message/mass/delete")?, self)?)
	}
}

impl<C, M> Client<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Sends `content` to every open id in `to_users`, returning the job's `msg_id`.
	pub async fn mass_send_by_open_id(
		&self,
		to_users: Vec<OpenId>,
		content: MassContent,
	) -> Result<i64> {
		let op = MassSendByOpenId::new(to_users, content)?;

		Ok(self.execute(&op).await?.msg_id)
	}

	/// Withdraws a mass message.
	pub async fn mass_delete(&self, msg_id: i64) -> Result<()> {
		self.execute(&MassDelete { msg_id }).await.map(|_| ())
	}
}
