//! pb 子格式
//!
//! 只覆盖本编码器需要自行构造的两个载荷：
//! - serviceType 45 的 Markdown 元素 (单字段)
//! - serviceType 48 的富媒体 MsgInfo 描述
//!
//! 外层消息封包的序列化属于上传/发送协作方，不在此处。

/// Markdown 元素载荷
#[derive(Clone, PartialEq, prost::Message)]
pub struct MarkdownContent {
    #[prost(string, tag = "1")]
    pub content: String,
}

/// 富媒体元素载荷
#[derive(Clone, PartialEq, prost::Message)]
pub struct MsgInfo {
    #[prost(message, repeated, tag = "1")]
    pub msg_info_body: Vec<MsgInfoBody>,
    #[prost(message, optional, tag = "2")]
    pub ext_biz_info: Option<ExtBizInfo>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct MsgInfoBody {
    #[prost(message, optional, tag = "1")]
    pub index: Option<IndexNode>,
    #[prost(message, optional, tag = "2")]
    pub pic: Option<PicInfo>,
    #[prost(bool, tag = "5")]
    pub file_exist: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct IndexNode {
    #[prost(message, optional, tag = "1")]
    pub info: Option<FileInfo>,
    #[prost(string, tag = "2")]
    pub file_uuid: String,
    #[prost(uint32, tag = "3")]
    pub store_id: u32,
    #[prost(uint32, tag = "5")]
    pub expire: u32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct FileInfo {
    #[prost(uint64, tag = "1")]
    pub file_size: u64,
    #[prost(string, tag = "2")]
    pub md5_hex_str: String,
    #[prost(string, tag = "3")]
    pub sha1_hex_str: String,
    #[prost(string, tag = "4")]
    pub file_name: String,
    #[prost(message, optional, tag = "5")]
    pub file_type: Option<FileType>,
    #[prost(uint32, tag = "6")]
    pub width: u32,
    #[prost(uint32, tag = "7")]
    pub height: u32,
    #[prost(uint32, tag = "8")]
    pub time: u32,
    #[prost(uint32, tag = "9")]
    pub original: u32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct FileType {
    #[prost(uint32, tag = "1")]
    pub r#type: u32,
    /// 图片格式码：2000 动图，1000 静图
    #[prost(uint32, tag = "2")]
    pub pic_format: u32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct PicInfo {
    #[prost(string, tag = "1")]
    pub url_path: String,
    #[prost(message, optional, tag = "2")]
    pub ext: Option<PicUrlExt>,
    #[prost(string, tag = "3")]
    pub domain: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct PicUrlExt {
    #[prost(string, tag = "1")]
    pub original_param: String,
    #[prost(string, tag = "2")]
    pub big_param: String,
    #[prost(string, tag = "3")]
    pub thumb_param: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ExtBizInfo {
    #[prost(message, optional, tag = "2")]
    pub pic: Option<PicExtBizInfo>,
    #[prost(uint32, tag = "10")]
    pub busi_type: u32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct PicExtBizInfo {
    #[prost(uint32, tag = "1")]
    pub biz_type: u32,
    #[prost(string, tag = "2")]
    pub summary: String,
    /// 怀旧版 PCQQ 私聊收图需要
    #[prost(uint32, tag = "11")]
    pub from_scene: u32,
    #[prost(uint32, tag = "12")]
    pub to_scene: u32,
    /// 怀旧版 PCQQ 群聊收图需要
    #[prost(uint32, optional, tag = "13")]
    pub old_file_id: Option<u32>,
}
