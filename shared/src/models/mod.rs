//! API view models and request payloads
//!
//! - [`catalog`] - 商品目录视图
//! - [`cart`] - 购物车请求/视图
//! - [`checkout`] - 结算结果
//! - [`auth`] - 注册/登录

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
