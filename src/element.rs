//! NT 协议消息封包的数据模型
//!
//! 一个 [`Envelope`] 对应合并转发记录里的一条消息 (一个 "turn")。
//! 外层 pb 序列化由发送/上传协作方完成，这里只负责结构。

use serde::{Deserialize, Serialize};

/// 可渲染的消息元素
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum Elem {
    /// 文本串
    Text { str: String },
    /// 系统表情索引
    Face { index: i32 },
    /// 通用元素，pb 子格式载荷 (富媒体 serviceType 48 / Markdown serviceType 45)
    #[serde(rename_all = "camelCase")]
    CommonElem {
        service_type: i32,
        pb_elem: Vec<u8>,
        business_type: i32,
    },
    /// 小程序卡片 (转发卡片：标记字节 + deflate 压缩载荷)
    LightApp { data: Vec<u8> },
}

/// 路由头：发送者身份与会话形态
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoutingHead {
    pub from_uin: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c2c: Option<C2cHead>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupHead>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct C2cHead {
    pub friend_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupHead {
    pub group_code: i64,
    pub group_card: String,
}

/// 内容头：消息类型码、随机数与序号
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentHead {
    pub msg_type: i32,
    pub random: u32,
    pub msg_seq: u32,
    pub msg_time: i64,
    pub pkg_num: i32,
    pub pkg_index: i32,
    pub div_seq: i32,
    pub forward: ForwardHead,
}

/// 转发簿记字段，非顶层消息全部置零
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ForwardHead {
    pub field1: i32,
    pub field2: i32,
    pub field3: i32,
    pub field4: String,
    pub avatar: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RichText {
    pub elems: Vec<Elem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MsgBody {
    pub rich_text: RichText,
}

/// 一条可路由的封包消息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub routing_head: RoutingHead,
    pub content_head: ContentHead,
    pub body: MsgBody,
}

impl Envelope {
    /// 封包内的元素列表
    pub fn elems(&self) -> &[Elem] {
        &self.body.rich_text.elems
    }
}

/// 群聊消息类型码
pub const MSG_TYPE_GROUP: i32 = 82;
/// 私聊消息类型码
pub const MSG_TYPE_C2C: i32 = 9;
/// 转发记录内群消息使用的占位群号
pub const FALLBACK_GROUP_CODE: i64 = 284840486;
/// 未指定发送者时的占位 uin
pub const FALLBACK_UIN: i64 = 1094950020;
