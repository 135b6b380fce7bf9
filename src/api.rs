//! 外部协作方接口
//!
//! 媒体解析、文件上传与转发记录上传都不属于编码器本体，
//! 以 trait 形式注入，测试中用内存实现替代。

use crate::element::Envelope;
use crate::segment::ImageData;
use crate::{BotIdentity, Peer};
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 元素类型码 (上传接口使用)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ElementType {
    Text = 1,
    Pic = 2,
    Ptt = 4,
    Video = 5,
}

/// 图片格式，动图与静图走不同的格式码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
}

impl ImageFormat {
    pub fn is_animated(&self) -> bool {
        matches!(self, ImageFormat::Gif)
    }
}

/// 富媒体登记结果：远端文件 id、校验和、尺寸与格式
#[derive(Debug, Clone, Default)]
pub struct MediaDescriptor {
    pub file_id: String,
    pub md5: String,
    pub sha1: String,
    pub file_name: String,
    pub file_size: u64,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

/// 富媒体协作方
#[async_trait]
pub trait RichMediaApi: Send + Sync {
    /// 将图片消息段解析为本地文件路径。
    /// 返回的路径由编码器登记，发送完成后统一删除。
    async fn resolve_media_source(&self, image: &ImageData) -> Result<PathBuf>;

    /// 上传本地文件，返回远端暂存路径
    async fn upload_file(
        &self,
        path: &Path,
        element_type: ElementType,
        busi_type: i32,
    ) -> Result<PathBuf>;

    /// 登记富媒体文件，换取文件描述
    async fn upload_media_descriptor(
        &self,
        remote_path: &Path,
        chat_kind: i32,
        owner_uid: &str,
    ) -> Result<MediaDescriptor>;
}

/// 转发记录上传协作方
#[async_trait]
pub trait ForwardUploader: Send + Sync {
    /// 上传一组封包消息，返回后端分配的 resid
    async fn upload_forward(&self, peer: &Peer, envelopes: &[Envelope]) -> Result<String>;
}

/// 编码器运行上下文
///
/// 登录身份在顶层 generate 前解析一次后只读传递，不走全局状态。
#[derive(Clone)]
pub struct EncoderContext {
    pub media: Arc<dyn RichMediaApi>,
    pub forward: Arc<dyn ForwardUploader>,
    pub identity: BotIdentity,
}
