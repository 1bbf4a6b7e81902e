//! ClassFactory and ClassContract bindings

use alloy::sol;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    #[derive(Debug)]
    interface ClassFactory {
        struct ClassInfo {
            address classAddress;
            string name;
            string symbol;
        }

        function createClass(string name, string symbol) external returns (address);
        function getClasses() external view returns (ClassInfo[] memory);
        function getEligibleClasses(address student) external view returns (ClassInfo[] memory);
        function linkQuizToClass(address classAddress, address quizContract) external;
        function getClassQuizzes(address classAddress) external view returns (address[] memory);
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    #[derive(Debug)]
    interface ClassContract {
        struct Lecture {
            uint256 id;
            string topic;
            uint256 date;
        }

        function owner() external view returns (address);
        function totalSupply() external view returns (uint256);
        function ownerOf(uint256 tokenId) external view returns (address);
        function getStudentName(uint256 tokenId) external view returns (string memory);

        function mintNFT(address to, string studentName) external;
        function createLecture(string topic) external;
        function getLectures() external view returns (Lecture[] memory);

        function markAttendance(uint256 lectureId) external;
        function getAllAttendance(uint256 lectureId)
            external
            view
            returns (address[] memory students, string[] memory names);
        function getOwnAttendance() external view returns (bool[] memory);
    }
}
