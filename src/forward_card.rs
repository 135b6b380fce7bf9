//! 转发卡片 (lightApp) 子格式
//!
//! 线格式为兼容性约束：1 字节标记 0x01 + zlib deflate 压缩的 JSON 载荷，
//! 必须逐字节复现。编码/解码收敛在本模块，独立于递归算法测试。

use anyhow::{Result, bail};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use uuid::Uuid;

/// 载荷前的格式标记字节
pub const CARD_MARKER: u8 = 1;

/// 转发记录摘要行 (最多 4 条)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsEntry {
    pub text: String,
}

impl NewsEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// 卡片外显参数，缺省项在打包时补默认值
#[derive(Debug, Clone, Default)]
pub struct ForwardCardOptions {
    pub source: Option<String>,
    pub news: Option<Vec<NewsEntry>>,
    pub summary: Option<String>,
    pub prompt: Option<String>,
}

/// 卡片 JSON 载荷
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForwardCard {
    pub app: String,
    pub config: CardConfig,
    pub desc: String,
    /// 内嵌 JSON 字符串: `{"filename": uniseq, "tsum": 0}`
    pub extra: String,
    pub meta: CardMeta,
    pub prompt: String,
    pub ver: String,
    pub view: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardConfig {
    pub autosize: u32,
    pub forward: u32,
    pub round: u32,
    #[serde(rename = "type")]
    pub card_type: String,
    pub width: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardMeta {
    pub detail: CardDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardDetail {
    pub news: Vec<NewsEntry>,
    pub resid: String,
    pub source: String,
    pub summary: String,
    /// 卡片关联 id，与 extra.filename 一致
    pub uniseq: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardExtra {
    pub filename: String,
    pub tsum: u32,
}

/// 打包转发卡片：resid + 外显参数 -> 标记字节 + 压缩载荷
pub fn pack(resid: &str, options: &ForwardCardOptions) -> Result<Vec<u8>> {
    let uniseq = Uuid::new_v4().to_string();
    let prompt = options.prompt.clone().unwrap_or_else(|| "[聊天记录]".to_string());

    let card = ForwardCard {
        app: "com.tencent.multimsg".to_string(),
        config: CardConfig {
            autosize: 1,
            forward: 1,
            round: 1,
            card_type: "normal".to_string(),
            width: 300,
        },
        desc: prompt.clone(),
        extra: serde_json::to_string(&CardExtra {
            filename: uniseq.clone(),
            tsum: 0,
        })?,
        meta: CardMeta {
            detail: CardDetail {
                news: options
                    .news
                    .clone()
                    .filter(|news| !news.is_empty())
                    .unwrap_or_else(|| vec![NewsEntry::new("查看转发消息")]),
                resid: resid.to_string(),
                source: options.source.clone().unwrap_or_else(|| "聊天记录".to_string()),
                summary: options
                    .summary
                    .clone()
                    .unwrap_or_else(|| "查看转发消息".to_string()),
                uniseq,
            },
        },
        prompt,
        ver: "0.0.0.5".to_string(),
        view: "contact".to_string(),
    };

    let body = serde_json::to_vec(&card)?;
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(body.len() / 2 + 1), Compression::default());
    encoder.write_all(&body)?;
    let compressed = encoder.finish()?;

    let mut out = Vec::with_capacity(compressed.len() + 1);
    out.push(CARD_MARKER);
    out.extend_from_slice(&compressed);
    Ok(out)
}

/// 解包转发卡片 (标记字节校验 + inflate + JSON 解析)
pub fn unpack(data: &[u8]) -> Result<ForwardCard> {
    let Some((&marker, compressed)) = data.split_first() else {
        bail!("转发卡片载荷为空");
    };
    if marker != CARD_MARKER {
        bail!("转发卡片标记字节不符: {marker:#04x}");
    }
    let mut body = Vec::new();
    ZlibDecoder::new(compressed).read_to_end(&mut body)?;
    Ok(serde_json::from_slice(&body)?)
}
