//! Merchant groups and the product category tree.

// self
use crate::{
	_prelude::*,
	api,
	client::{Client, Operation},
	http::PlatformHttpClient,
	platform::PlatformDescriptor,
	remote::{Ack, RemoteRequest, TransportErrorMapper},
};

/// Root of the category tree.
pub const ROOT_CATEGORY_ID: i64 = 1;

/// A product group to create.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NewGroup {
	/// Display name.
	pub group_name: String,
	/// Product identifiers placed in the group.
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub product_list: Vec<String>,
}

/// `POST merchant/group/add`.
#[derive(Clone, Debug, Serialize)]
pub struct GroupAdd {
	/// Group to create; the platform assigns the id.
	pub group_detail: NewGroup,
}
impl Operation for GroupAdd {
	type Output = GroupCreated;

	fn name(&self) -> &'static str {
		"merchant_group_add"
	}

	fn request(&self, descriptor: &PlatformDescriptor) -> Result<RemoteRequest> {
		Ok(RemoteRequest::post_json(descriptor.api_url("merchant/group/add")?, self)?)
	}
}

/// Response of [`GroupAdd`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct GroupCreated {
	/// Identifier assigned by the platform.
	pub group_id: i64,
}

/// `POST merchant/group/del`.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct GroupDelete {
	/// Group to delete.
	pub group_id: i64,
}
impl Operation for GroupDelete {
	type Output = Ack;

	fn name(&self) -> &'static str {
		"merchant_group_del"
	}

	fn request(&self, descriptor: &PlatformDescriptor) -> Result<RemoteRequest> {
		Ok(RemoteRequest::post_json(descriptor.api_url("merchant/group/del")?, self)?)
	}
}

/// `POST merchant/group/propertymod`: renames a group.
#[derive(Clone, Debug, Serialize)]
pub struct GroupRename {
	/// Group to rename.
	pub group_id: i64,
	/// New display name.
	pub group_name: String,
}
impl Operation for GroupRename {
	type Output = Ack;

	fn name(&self) -> &'static str {
		"merchant_group_propertymod"
	}

	fn request(&self, descriptor: &PlatformDescriptor) -> Result<RemoteRequest> {
		Ok(RemoteRequest::post_json(descriptor.api_url("merchant/group/propertymod")?, self)?)
	}
}

/// One node of the category tree.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Category {
	/// Category id; the platform sends it as a string.
	pub id: String,
	/// Category name.
	pub name: String,
}

/// A category property and its allowed values.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Property {
	/// Property id.
	pub id: String,
	/// Property name.
	pub name: String,
	/// Allowed values.
	#[serde(rename = "property_value", default)]
	pub values: Vec<PropertyValue>,
}

/// One allowed value of a [`Property`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PropertyValue {
	/// Value id.
	pub id: String,
	/// Value name.
	pub name: String,
}

/// `POST merchant/category/getsub`: direct children of a category.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct CategorySubList {
	/// Parent category.
	pub cate_id: i64,
}
impl Operation for CategorySubList {
	type Output = CategoryList;

	fn name(&self) -> &'static str {
		"merchant_category_getsub"
	}

	fn request(&self, descriptor: &PlatformDescriptor) -> Result<RemoteRequest> {
		Ok(RemoteRequest::post_json(descriptor.api_url("merchant/category/getsub")?, self)?)
	}
}

/// Response of [`CategorySubList`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CategoryList {
	/// Child categories.
	#[serde(default)]
	pub cate_list: Vec<Category>,
}

/// `POST merchant/category/getproperty`: properties of a leaf category.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct CategoryProperties {
	/// Leaf category.
	pub cate_id: i64,
}
impl Operation for CategoryProperties {
	type Output = PropertyList;

	fn name(&self) -> &'static str {
		"merchant_category_getproperty"
	}

	fn request(&self, descriptor: &PlatformDescriptor) -> Result<RemoteRequest> {
		Ok(RemoteRequest::post_json(descriptor.api_url("merchant/category/getproperty")?, self)?)
	}
}

/// Response of [`CategoryProperties`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PropertyList {
	/// Properties of the category.
	#[serde(default)]
	pub properties: Vec<Property>,
}

impl<C, M> Client<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a product group and returns its id.
	pub async fn merchant_group_add(&self, group: NewGroup) -> Result<i64> {
		api::require(!group.group_name.is_empty(), "group name is empty")?;

		Ok(self.execute(&GroupAdd { group_detail: group }).await?.group_id)
	}

	/// Deletes a product group.
	pub async fn merchant_group_delete(&self, group_id: i64) -> Result<()> {
		self.execute(&GroupDelete { group_id }).await.map(|_| ())
	}

	/// Renames a product group.
	pub async fn merchant_group_rename(
		&self,
		group_id: i64,
		new_name: impl Into<String>,
	) -> Result<()> {
		let group_name = new_name.into();

		api::require(!group_name.is_empty(), "new group name is empty")?;

		self.execute(&GroupRename { group_id, group_name }).await.map(|_| ())
	}

	/// Lists the direct children of `cate_id` (use [`ROOT_CATEGORY_ID`] for the top level).
	pub async fn merchant_category_children(&self, cate_id: i64) -> Result<Vec<Category>> {
		Ok(self.execute(&CategorySubList { cate_id }).await?.cate_list)
	}

	/// Lists the properties of a leaf category.
	pub async fn merchant_category_properties(&self, cate_id: i64) -> Result<Vec<Property>> {
		Ok(self.execute(&CategoryProperties { cate_id }).await?.properties)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn property_values_default_when_absent() {
		let list: PropertyList = serde_json::from_str(
			"{\"errcode\":0,\"properties\":[{\"id\":\"1\",\"name\":\"brand\"},\
			{\"id\":\"2\",\"name\":\"size\",\"property_value\":[{\"id\":\"21\",\"name\":\"L\"}]}]}",
		)
		.expect("Property list fixture should decode.");

		assert!(list.properties[0].values.is_empty());
		assert_eq!(list.properties[1].values[0].name, "L");
	}

	#[test]
	fn group_add_omits_empty_product_list() {
		let group = NewGroup { group_name: "new".into(), ..Default::default() };
		let request = GroupAdd { group_detail: group }
			.request(&PlatformDescriptor::official())
			.expect("Group add should build.");

		assert_eq!(
			request.body.as_deref(),
			Some(&b"{\"group_detail\":{\"group_name\":\"new\"}}"[..])
		);
	}
}
