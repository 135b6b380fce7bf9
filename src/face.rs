//! QQ 系统表情静态表
//!
//! 取自系统表情配置 (QSid -> QDes)，仅内置常用区段。
//! 查不到的 id 不影响编码，只是预览文本不追加内容。

/// (表情 id, 显示标签)
static SYS_FACES: &[(u32, &str)] = &[
    (0, "/惊讶"),
    (1, "/撇嘴"),
    (2, "/色"),
    (3, "/发呆"),
    (4, "/得意"),
    (5, "/流泪"),
    (6, "/害羞"),
    (7, "/闭嘴"),
    (8, "/睡"),
    (9, "/大哭"),
    (10, "/尴尬"),
    (11, "/发怒"),
    (12, "/调皮"),
    (13, "/呲牙"),
    (14, "/微笑"),
    (15, "/难过"),
    (16, "/酷"),
    (18, "/抓狂"),
    (19, "/吐"),
    (20, "/偷笑"),
    (21, "/可爱"),
    (22, "/白眼"),
    (23, "/傲慢"),
    (24, "/饥饿"),
    (25, "/困"),
    (26, "/惊恐"),
    (27, "/流汗"),
    (28, "/憨笑"),
    (29, "/悠闲"),
    (30, "/奋斗"),
    (31, "/咒骂"),
    (32, "/疑问"),
    (33, "/嘘"),
    (34, "/晕"),
    (35, "/折磨"),
    (36, "/衰"),
    (37, "/骷髅"),
    (38, "/敲打"),
    (39, "/再见"),
    (41, "/发抖"),
    (42, "/爱情"),
    (43, "/跳跳"),
    (46, "/猪头"),
    (49, "/拥抱"),
    (53, "/蛋糕"),
    (56, "/刀"),
    (59, "/便便"),
    (60, "/咖啡"),
    (63, "/玫瑰"),
    (64, "/凋谢"),
    (66, "/爱心"),
    (67, "/心碎"),
    (69, "/礼物"),
    (74, "/太阳"),
    (75, "/月亮"),
    (76, "/赞"),
    (77, "/踩"),
    (78, "/握手"),
    (79, "/胜利"),
    (85, "/飞吻"),
    (86, "/怄火"),
    (89, "/西瓜"),
    (96, "/冷汗"),
    (97, "/擦汗"),
    (98, "/抠鼻"),
    (99, "/鼓掌"),
    (100, "/糗大了"),
    (101, "/坏笑"),
    (102, "/左哼哼"),
    (103, "/右哼哼"),
    (104, "/哈欠"),
    (105, "/鄙视"),
    (106, "/委屈"),
    (107, "/快哭了"),
    (108, "/阴险"),
    (109, "/亲亲"),
    (110, "/吓"),
    (111, "/可怜"),
    (118, "/抱拳"),
    (120, "/拳头"),
    (122, "/爱你"),
    (123, "/NO"),
    (124, "/OK"),
    (129, "/挥手"),
    (144, "/喝彩"),
    (146, "/爆筋"),
    (171, "/茶"),
    (173, "/泪奔"),
    (174, "/无奈"),
    (175, "/卖萌"),
    (176, "/小纠结"),
    (178, "/斜眼笑"),
    (179, "/doge"),
    (181, "/戳一戳"),
    (182, "/笑哭"),
    (187, "/幽灵"),
    (192, "/红包"),
    (193, "/大笑"),
    (194, "/不开心"),
    (201, "/点赞"),
    (204, "/吃"),
    (212, "/托腮"),
    (222, "/抱抱"),
    (227, "/拍手"),
    (232, "/佛系"),
    (240, "/喷脸"),
    (243, "/甩头"),
    (264, "/捂脸"),
    (265, "/辣眼睛"),
    (266, "/哦哟"),
    (267, "/头秃"),
    (268, "/问号脸"),
    (269, "/暗中观察"),
    (270, "/emm"),
    (271, "/吃瓜"),
    (272, "/呵呵哒"),
    (273, "/我酸了"),
    (277, "/汪汪"),
    (278, "/汗"),
    (281, "/无眼笑"),
    (282, "/敬礼"),
    (283, "/狂笑"),
    (284, "/面无表情"),
    (285, "/摸鱼"),
    (287, "/哦"),
    (289, "/睁眼"),
    (290, "/敲开心"),
    (293, "/摸锦鲤"),
    (294, "/期待"),
    (297, "/拜谢"),
    (299, "/牛啊"),
    (305, "/右亲亲"),
    (306, "/牛气冲天"),
    (307, "/喵喵"),
    (311, "/打call"),
    (312, "/变形"),
    (314, "/仔细分析"),
    (318, "/崇拜"),
    (319, "/比心"),
    (320, "/庆祝"),
    (326, "/生气"),
    (339, "/舔屏"),
    (341, "/打招呼"),
    (342, "/酸Q"),
    (343, "/我方了"),
    (344, "/大怨种"),
    (345, "/红包多多"),
    (346, "/你真棒棒"),
];

/// 按表情 id 查显示标签，未收录时返回 None
pub fn resolve_face_label(id: &str) -> Option<&'static str> {
    let id: u32 = id.parse().ok()?;
    SYS_FACES
        .iter()
        .find(|(qsid, _)| *qsid == id)
        .map(|(_, label)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_face_resolves() {
        assert_eq!(resolve_face_label("14"), Some("/微笑"));
        assert_eq!(resolve_face_label("179"), Some("/doge"));
    }

    #[test]
    fn unknown_or_malformed_id_is_none() {
        assert_eq!(resolve_face_label("99999"), None);
        assert_eq!(resolve_face_label("abc"), None);
    }
}
